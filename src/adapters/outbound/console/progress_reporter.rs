use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const BAR_TEMPLATE: &str =
    "   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// Writes progress to stderr so it never mixes with score output on stdout.
/// One indicatif bar is created lazily per batch and cleared on completion
/// or error, so a following batch starts a fresh bar.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
            quiet: false,
        }
    }

    /// Reporter that only prints errors
    pub fn quiet() -> Self {
        Self {
            progress_bar: Mutex::new(None),
            quiet: true,
        }
    }

    fn with_progress_bar(&self, total: usize, update: impl FnOnce(&ProgressBar)) {
        let Ok(mut slot) = self.progress_bar.lock() else {
            return;
        };
        let pb = slot.get_or_insert_with(|| {
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
            let pb = ProgressBar::new(total as u64);
            pb.set_style(style);
            pb
        });
        pb.set_length(total as u64);
        update(pb);
    }

    fn finish_progress_bar(&self) {
        if let Ok(mut slot) = self.progress_bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        if self.quiet {
            return;
        }
        self.with_progress_bar(total, |pb| {
            pb.set_position(current as u64);
            if let Some(msg) = message {
                pb.set_message(msg.to_string());
            }
        });
    }

    fn report_error(&self, message: &str) {
        self.finish_progress_bar();
        eprintln!("{}", message);
    }

    fn report_completion(&self, message: &str) {
        self.finish_progress_bar();
        if !self.quiet {
            eprintln!();
            eprintln!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = StderrProgressReporter::new();
        // Can't easily test stderr output, but verify it doesn't panic
        reporter.report("Collecting registry");
        reporter.report_progress(5, 10, Some("git"));
        reporter.report_error("git: transport failure");
        reporter.report_completion("done");
    }

    #[test]
    fn test_progress_bar_is_reset_after_completion() {
        let reporter = StderrProgressReporter::new();
        reporter.report_progress(1, 3, None);
        reporter.report_completion("first batch");
        assert!(reporter.progress_bar.lock().unwrap().is_none());

        reporter.report_progress(1, 7, Some("second"));
        let length = reporter
            .progress_bar
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|pb| pb.length());
        assert_eq!(length, Some(7));
    }

    #[test]
    fn test_quiet_reporter_creates_no_bar() {
        let reporter = StderrProgressReporter::quiet();
        reporter.report_progress(1, 2, Some("git"));
        assert!(reporter.progress_bar.lock().unwrap().is_none());
    }
}
