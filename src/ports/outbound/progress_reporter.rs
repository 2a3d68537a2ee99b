/// ProgressReporter port for reporting progress during operations
///
/// This port abstracts user-facing progress output (e.g., to stderr)
/// during long-running collection runs. Diagnostics go through `tracing`.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress through a batch
    ///
    /// # Arguments
    /// * `current` - Items processed so far
    /// * `total` - Items expected in total
    /// * `message` - Optional message, usually the current plugin id
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
