/// Mock implementations for testing
mod mock_advisory_source;
mod mock_health_source;
mod mock_progress_reporter;
mod mock_registry_source;
mod mock_snapshot_source;

pub use mock_advisory_source::MockAdvisoryPageSource;
pub use mock_health_source::MockHealthSource;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_registry_source::MockRegistrySource;
pub use mock_snapshot_source::MockSnapshotSource;
