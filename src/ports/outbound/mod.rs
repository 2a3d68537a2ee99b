/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (artifact storage, upstream APIs, console).
pub mod advisory_page_source;
pub mod artifact_store;
pub mod health_source;
pub mod progress_reporter;
pub mod registry_source;
pub mod snapshot_source;

pub use advisory_page_source::AdvisoryPageSource;
pub use artifact_store::{ArtifactKey, ArtifactStore, ArtifactStream, Dataset, Stage};
pub use health_source::HealthSource;
pub use progress_reporter::ProgressReporter;
pub use registry_source::{PageRequest, RegistrySource};
pub use snapshot_source::SnapshotSource;
