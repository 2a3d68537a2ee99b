use plugin_canary::prelude::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Info,
    Progress,
    Error,
    Completion,
}

/// Mock ProgressReporter that records every call; clones share the log
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    pub entries: Arc<Mutex<Vec<(ReportKind, String)>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, kind: ReportKind) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(ReportKind::Error)
    }

    fn push(&self, kind: ReportKind, message: String) {
        self.entries.lock().unwrap().push((kind, message));
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.push(ReportKind::Info, message.to_string());
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        self.push(
            ReportKind::Progress,
            format!("{}/{} {}", current, total, message.unwrap_or_default()),
        );
    }

    fn report_error(&self, message: &str) {
        self.push(ReportKind::Error, message.to_string());
    }

    fn report_completion(&self, message: &str) {
        self.push(ReportKind::Completion, message.to_string());
    }
}
