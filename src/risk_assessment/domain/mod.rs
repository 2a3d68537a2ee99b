pub mod advisory;
pub mod advisory_event;
pub mod health;
pub mod plugin;
pub mod registry_entry;
pub mod score;
pub mod snapshot;
pub mod vulnerability;

pub use advisory::{AdvisoryCollection, AdvisoryRecord, SourceFailure, SourceFailureKind};
pub use advisory_event::{AdvisoryEvent, EventKey};
pub use health::{HealthDataset, HealthRecord};
pub use plugin::{AdvisoryMode, CollectionMode, PluginId};
pub use registry_entry::{IntegrityWarning, RegistryEntry, PLUGIN_SITE_BASE};
pub use score::{ScoreResult, MAX_SCORE, MIN_SCORE};
pub use snapshot::{Dependency, PluginSnapshot, SecurityWarning, VersionRange};
pub use vulnerability::{Cvss, CvssScore, Severity, SeveritySource, Vulnerability};
