/// NameHeuristic policy for a coarse prior based on the plugin id alone
///
/// Plugins handling credentials or identity carry the highest prior,
/// source-control integrations a medium one, everything else a small base.
///
/// Priority order (first match wins):
/// 1. Security terms: credentials, security, auth, oauth, saml, ldap
/// 2. SCM terms: git, svn, scm, github, bitbucket
/// 3. Anything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameHeuristic {
    SecuritySensitive,
    SourceControl,
    Generic,
}

const SECURITY_TERMS: &[&str] = &["credentials", "security", "auth", "oauth", "saml", "ldap"];
const SCM_TERMS: &[&str] = &["git", "svn", "scm", "github", "bitbucket"];

impl NameHeuristic {
    /// Classifies a plugin id by substring match, case-insensitively
    pub fn classify(plugin_id: &str) -> Self {
        let name = plugin_id.to_ascii_lowercase();
        if SECURITY_TERMS.iter().any(|t| name.contains(t)) {
            NameHeuristic::SecuritySensitive
        } else if SCM_TERMS.iter().any(|t| name.contains(t)) {
            NameHeuristic::SourceControl
        } else {
            NameHeuristic::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NameHeuristic::SecuritySensitive => "security",
            NameHeuristic::SourceControl => "scm",
            NameHeuristic::Generic => "generic",
        }
    }

    /// Human-readable explanation used in score reasons
    pub fn explanation(&self) -> &'static str {
        match self {
            NameHeuristic::SecuritySensitive => "plugin name suggests security-sensitive scope",
            NameHeuristic::SourceControl => "plugin name suggests source-control integration",
            NameHeuristic::Generic => "baseline prior for any plugin",
        }
    }
}
