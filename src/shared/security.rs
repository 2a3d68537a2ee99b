use crate::shared::error::CanaryError;
use crate::shared::Result;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

/// Upper bound for any single artifact read back from the store (100 MB)
pub const MAX_ARTIFACT_SIZE: u64 = 100 * 1024 * 1024;

/// Validates a string that will become one component of an artifact path.
///
/// Identifiers come from upstream payloads, so they are untrusted: path
/// separators, parent references and control characters are rejected.
pub fn validate_path_component(component: &str, description: &str) -> Result<()> {
    if component.is_empty() {
        anyhow::bail!("Security: {} must not be empty", description);
    }

    if component == "." || component == ".." {
        anyhow::bail!(
            "Security: {} must not be a relative directory reference",
            description
        );
    }

    if component.contains('/') || component.contains('\\') {
        anyhow::bail!(
            "Security: {} contains path separators which are not allowed",
            description
        );
    }

    if component.chars().any(|c| c.is_control()) {
        anyhow::bail!(
            "Security: {} contains control characters which are not allowed",
            description
        );
    }

    Ok(())
}

/// Reads an artifact file if it exists.
///
/// # Security
/// Symbolic links, non-regular files and files larger than
/// [`MAX_ARTIFACT_SIZE`] are rejected. Metadata is read with
/// `symlink_metadata()` so the link itself is checked, not its target.
///
/// # Returns
/// `Ok(None)` when the file does not exist.
pub fn read_artifact_file(path: &Path) -> Result<Option<String>> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CanaryError::ArtifactRead {
                path: path.to_path_buf(),
                details: format!("Failed to read metadata: {}", e),
            }
            .into())
        }
    };

    if metadata.is_symlink() {
        return Err(CanaryError::ArtifactRead {
            path: path.to_path_buf(),
            details: "Security: artifact is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        return Err(CanaryError::ArtifactRead {
            path: path.to_path_buf(),
            details: "Not a regular file".to_string(),
        }
        .into());
    }

    if metadata.len() > MAX_ARTIFACT_SIZE {
        return Err(CanaryError::ArtifactRead {
            path: path.to_path_buf(),
            details: format!(
                "Security: artifact is too large ({} bytes). Maximum allowed size is {} bytes.",
                metadata.len(),
                MAX_ARTIFACT_SIZE
            ),
        }
        .into());
    }

    let content = fs::read_to_string(path).map_err(|e| CanaryError::ArtifactRead {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(Some(content))
}
