use crate::risk_assessment::services::url_canonicalizer::CanonicalizationError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// Batch commands distinguish "finished, but some plugins failed" from
/// outright application errors so schedulers can retry selectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every requested unit of work succeeded (or was skipped as already done)
    Success = 0,
    /// A batch command finished but recorded per-item failures
    CompletedWithFailures = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (network error, missing artifact, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::CompletedWithFailures => write!(f, "Completed With Failures (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for the collection and scoring pipeline.
///
/// Uses thiserror to derive Display and Error traits automatically.
/// Integrity problems in upstream data are not errors; see
/// [`IntegrityWarning`](crate::risk_assessment::domain::IntegrityWarning).
#[derive(Debug, Error)]
pub enum CanaryError {
    #[error("Upstream request failed: {url}\nDetails: {details}\n\n💡 Hint: Check network connectivity or retry later; the request was not retried automatically")]
    Transport {
        url: String,
        status: Option<u16>,
        details: String,
    },

    #[error("Unexpected payload from {source_name}\nDetails: {details}")]
    Parse {
        source_name: String,
        details: String,
    },

    #[error("Invalid advisory URL: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("Unknown plugin: {plugin_id}\n\n💡 Hint: Verify the plugin id on https://plugins.jenkins.io/ or use a curated pilot plugin")]
    NotFound { plugin_id: String },

    #[error("Missing {artifact} artifact for plugin: {plugin_id}\n\n💡 Hint: {hint}")]
    MissingArtifact {
        plugin_id: String,
        artifact: String,
        hint: String,
    },

    #[error("Missing {dataset} artifact\n\n💡 Hint: {hint}")]
    MissingDataset { dataset: String, hint: String },

    #[error("Invalid plugin id: {value:?}\nReason: {reason}")]
    InvalidPluginId { value: String, reason: String },

    #[error("Failed to read artifact: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the data directory exists and is readable")]
    ArtifactRead { path: PathBuf, details: String },

    #[error("Failed to write artifact: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the data directory exists and you have write permissions")]
    ArtifactWrite { path: PathBuf, details: String },

    /// Validation error for requests and configuration values
    #[error("Validation error: {message}")]
    Validation { message: String },
}

/// HTTP status carried by a transport error, if any
pub fn transport_status(error: &anyhow::Error) -> Option<u16> {
    match error.downcast_ref::<CanaryError>() {
        Some(CanaryError::Transport { status, .. }) => *status,
        _ => None,
    }
}

/// Coarse classification used when recording per-item failures in batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Parse,
    Canonicalization,
    NotFound,
    MissingArtifact,
    Storage,
    Other,
}

impl ErrorKind {
    /// Classifies an error chain by looking for a [`CanaryError`] inside it.
    pub fn of(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<CanaryError>() {
            Some(CanaryError::Transport { .. }) => ErrorKind::Transport,
            Some(CanaryError::Parse { .. }) => ErrorKind::Parse,
            Some(CanaryError::Canonicalization(_)) => ErrorKind::Canonicalization,
            Some(CanaryError::NotFound { .. }) => ErrorKind::NotFound,
            Some(CanaryError::MissingArtifact { .. }) | Some(CanaryError::MissingDataset { .. }) => {
                ErrorKind::MissingArtifact
            }
            Some(CanaryError::ArtifactRead { .. }) | Some(CanaryError::ArtifactWrite { .. }) => {
                ErrorKind::Storage
            }
            Some(CanaryError::InvalidPluginId { .. }) | Some(CanaryError::Validation { .. }) => {
                ErrorKind::Other
            }
            None => ErrorKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Parse => "parse",
            ErrorKind::Canonicalization => "canonicalization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::MissingArtifact => "missing_artifact",
            ErrorKind::Storage => "storage",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
