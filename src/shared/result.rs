/// Type alias for Result with anyhow::Error as the error type.
/// Typed failures are [`CanaryError`](crate::shared::error::CanaryError) values carried inside it.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
