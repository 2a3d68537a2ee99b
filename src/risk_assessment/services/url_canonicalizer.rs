//! Canonicalization of advisory source URLs.
//!
//! Warning URLs come straight from upstream metadata and are occasionally
//! malformed (scheme-less, `http`, bare `jenkins.io`, broken bracketed IPv6
//! hosts). [`canonicalize`] accepts any string and returns either an
//! absolute `https` URL or a typed [`CanonicalizationError`]; it never panics.

use std::fmt;
use std::net::Ipv6Addr;
use thiserror::Error;
use url::Url;

const APEX_HOST: &str = "jenkins.io";
const CANONICAL_HOST: &str = "www.jenkins.io";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizationError {
    #[error("URL is empty")]
    Empty,

    #[error("URL contains whitespace or control characters")]
    InvalidCharacter,

    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("unbalanced brackets in host '{0}'")]
    UnbalancedBrackets(String),

    #[error("malformed IPv6 host '{0}'")]
    MalformedIpv6(String),

    #[error("IPv6 zone identifiers are not supported: '{0}'")]
    ZoneIdentifier(String),

    #[error("invalid port in '{0}'")]
    InvalidPort(String),

    #[error("URL could not be parsed: {0}")]
    Unparseable(String),
}

/// An absolute `https` URL that passed canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.0.fragment().filter(|f| !f.is_empty())
    }

    /// The page address: query and fragment removed.
    pub fn without_fragment(&self) -> CanonicalUrl {
        let mut url = self.0.clone();
        url.set_query(None);
        url.set_fragment(None);
        CanonicalUrl(url)
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonicalizes a raw advisory URL.
///
/// Missing and `http` schemes become `https`, `jenkins.io` becomes
/// `www.jenkins.io`, and path, query and fragment are preserved.
pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, CanonicalizationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CanonicalizationError::Empty);
    }

    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CanonicalizationError::InvalidCharacter);
    }

    let rest = strip_scheme(trimmed)?;
    let authority_end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    check_authority(&rest[..authority_end])?;

    let candidate = format!("https://{}", rest);
    let mut url =
        Url::parse(&candidate).map_err(|e| CanonicalizationError::Unparseable(e.to_string()))?;

    match url.host_str() {
        None | Some("") => return Err(CanonicalizationError::MissingHost),
        Some(APEX_HOST) => {
            url.set_host(Some(CANONICAL_HOST))
                .map_err(|e| CanonicalizationError::Unparseable(e.to_string()))?;
        }
        Some(_) => {}
    }

    Ok(CanonicalUrl(url))
}

/// Returns everything after `scheme://`, accepting only http(s) or no scheme.
fn strip_scheme(input: &str) -> Result<&str, CanonicalizationError> {
    if let Some(rest) = input.strip_prefix("//") {
        return Ok(rest);
    }

    if let Some(idx) = input.find("://") {
        let scheme = &input[..idx];
        return if is_web_scheme(scheme) {
            Ok(&input[idx + 3..])
        } else {
            Err(CanonicalizationError::UnsupportedScheme(scheme.to_string()))
        };
    }

    // "scheme:opaque" versus "host:port/path"
    if let Some(idx) = input.find(':') {
        let prefix = &input[..idx];
        let after = &input[idx + 1..];
        let looks_like_scheme = prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        let looks_like_port = after.starts_with(|c: char| c.is_ascii_digit());

        if looks_like_scheme && !looks_like_port && !prefix.contains('.') {
            return if is_web_scheme(prefix) {
                Ok(after.trim_start_matches('/'))
            } else {
                Err(CanonicalizationError::UnsupportedScheme(prefix.to_string()))
            };
        }
    }

    Ok(input)
}

fn is_web_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http")
}

/// Validates the `[userinfo@]host[:port]` section before handing it to the parser.
fn check_authority(authority: &str) -> Result<(), CanonicalizationError> {
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    if host_port.is_empty() {
        return Err(CanonicalizationError::MissingHost);
    }

    if host_port.contains('[') || host_port.contains(']') {
        return check_bracketed_host(host_port);
    }

    let (host, port) = match host_port.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    };
    if host.is_empty() {
        return Err(CanonicalizationError::MissingHost);
    }
    if let Some(port) = port {
        check_port(port, host_port)?;
    }
    Ok(())
}

fn check_bracketed_host(host_port: &str) -> Result<(), CanonicalizationError> {
    let unbalanced = || CanonicalizationError::UnbalancedBrackets(host_port.to_string());

    if !host_port.starts_with('[')
        || host_port.matches('[').count() != 1
        || host_port.matches(']').count() != 1
    {
        return Err(unbalanced());
    }
    let close = host_port.find(']').ok_or_else(unbalanced)?;

    let literal = &host_port[1..close];
    if literal.is_empty() {
        return Err(CanonicalizationError::MissingHost);
    }
    if literal.contains('%') {
        return Err(CanonicalizationError::ZoneIdentifier(host_port.to_string()));
    }
    if literal.parse::<Ipv6Addr>().is_err() {
        return Err(CanonicalizationError::MalformedIpv6(host_port.to_string()));
    }

    let after = &host_port[close + 1..];
    if after.is_empty() {
        return Ok(());
    }
    match after.strip_prefix(':') {
        Some(port) => check_port(port, host_port),
        None => Err(CanonicalizationError::InvalidPort(host_port.to_string())),
    }
}

fn check_port(port: &str, host_port: &str) -> Result<(), CanonicalizationError> {
    // An empty port ("host:") is legal and means the default.
    if port.is_empty() {
        return Ok(());
    }
    if !port.chars().all(|c| c.is_ascii_digit()) || port.parse::<u16>().is_err() {
        return Err(CanonicalizationError::InvalidPort(host_port.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(raw: &str) -> String {
        canonicalize(raw).unwrap().to_string()
    }

    // ========== Normalization tests ==========

    #[test]
    fn test_http_is_upgraded_and_apex_host_rewritten() {
        assert_eq!(
            ok("http://jenkins.io/security/advisory/2016-07-27/"),
            "https://www.jenkins.io/security/advisory/2016-07-27/"
        );
    }

    #[test]
    fn test_scheme_less_inputs() {
        assert_eq!(
            ok("jenkins.io/security/advisory/2019-01-28/"),
            "https://www.jenkins.io/security/advisory/2019-01-28/"
        );
        assert_eq!(
            ok("//www.jenkins.io/security/"),
            "https://www.jenkins.io/security/"
        );
        assert_eq!(ok("localhost:8080/x"), "https://localhost:8080/x");
    }

    #[test]
    fn test_query_and_fragment_preserved() {
        let url = canonicalize(
            "  https://www.jenkins.io/security/advisory/2020-02-12/?x=1#SECURITY-1713  ",
        )
        .unwrap();
        assert_eq!(url.fragment(), Some("SECURITY-1713"));
        assert_eq!(url.as_url().query(), Some("x=1"));
        assert_eq!(
            url.without_fragment().as_str(),
            "https://www.jenkins.io/security/advisory/2020-02-12/"
        );
    }

    #[test]
    fn test_uppercase_scheme_and_host() {
        assert_eq!(
            ok("HTTP://JENKINS.IO/security/"),
            "https://www.jenkins.io/security/"
        );
    }

    #[test]
    fn test_single_slash_http() {
        assert_eq!(ok("http:/jenkins.io/a"), "https://www.jenkins.io/a");
    }

    #[test]
    fn test_valid_ipv6_host() {
        assert_eq!(ok("https://[::1]:8443/x"), "https://[::1]:8443/x");
    }

    // ========== Rejection tests ==========

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(canonicalize(""), Err(CanonicalizationError::Empty));
        assert_eq!(canonicalize("   \t"), Err(CanonicalizationError::Empty));
        assert_eq!(
            canonicalize("//[\n"),
            Err(CanonicalizationError::InvalidCharacter)
        );
        assert_eq!(
            canonicalize("https://www.jenkins.io/a b"),
            Err(CanonicalizationError::InvalidCharacter)
        );
    }

    #[test]
    fn test_unsupported_schemes() {
        assert!(matches!(
            canonicalize("ftp://jenkins.io/x"),
            Err(CanonicalizationError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            canonicalize("javascript:alert(1)"),
            Err(CanonicalizationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            canonicalize("mailto:security@jenkins.io"),
            Err(CanonicalizationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(
            canonicalize("https://"),
            Err(CanonicalizationError::MissingHost)
        );
        assert_eq!(
            canonicalize("/security/advisory/"),
            Err(CanonicalizationError::MissingHost)
        );
        assert_eq!(
            canonicalize("https://[]/"),
            Err(CanonicalizationError::MissingHost)
        );
        assert_eq!(
            canonicalize("https://user@/x"),
            Err(CanonicalizationError::MissingHost)
        );
        assert_eq!(
            canonicalize("https://:443/x"),
            Err(CanonicalizationError::MissingHost)
        );
    }

    #[test]
    fn test_unbalanced_brackets() {
        for raw in [
            "[::1",
            "::1]",
            "https://[::1/x",
            "https://::1]/x",
            "https://[[::1]/",
            "https://[::1]]/",
            "https://]::1[/",
            "http://www.jenkins.io[/",
        ] {
            assert!(
                matches!(
                    canonicalize(raw),
                    Err(CanonicalizationError::UnbalancedBrackets(_))
                ),
                "expected unbalanced brackets for {:?}, got {:?}",
                raw,
                canonicalize(raw)
            );
        }
    }

    #[test]
    fn test_zone_identifier() {
        assert!(matches!(
            canonicalize("https://[fe80::1%25eth0]/"),
            Err(CanonicalizationError::ZoneIdentifier(_))
        ));
        assert!(matches!(
            canonicalize("[fe80::1%eth0]"),
            Err(CanonicalizationError::ZoneIdentifier(_))
        ));
    }

    #[test]
    fn test_malformed_ipv6_literal() {
        assert!(matches!(
            canonicalize("https://[not-an-address]/"),
            Err(CanonicalizationError::MalformedIpv6(_))
        ));
        assert!(matches!(
            canonicalize("https://[:::]/"),
            Err(CanonicalizationError::MalformedIpv6(_))
        ));
    }

    #[test]
    fn test_invalid_ports() {
        assert!(matches!(
            canonicalize("https://[::1]:99999/"),
            Err(CanonicalizationError::InvalidPort(_))
        ));
        assert!(matches!(
            canonicalize("https://[::1]x/"),
            Err(CanonicalizationError::InvalidPort(_))
        ));
        assert!(matches!(
            canonicalize("https://www.jenkins.io:8a/"),
            Err(CanonicalizationError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_outputs_reparse() {
        for raw in [
            "jenkins.io",
            "http://jenkins.io/security/advisory/2016-07-27/#SECURITY-309",
            "https://[2001:db8::1]/advisory",
            "www.jenkins.io:443",
        ] {
            let url = canonicalize(raw).unwrap();
            let reparsed = Url::parse(url.as_str()).unwrap();
            assert_eq!(reparsed.scheme(), "https");
            assert!(reparsed.host_str().is_some());
        }
    }
}
