//! plugin-canary - ecosystem risk signals for Jenkins plugins
//!
//! This library collects upstream data about Jenkins plugins (the plugin
//! registry, per-plugin metadata, security advisories and health scores),
//! stores it as plain JSON/JSONL artifacts, and derives an explainable
//! baseline risk score per plugin. It follows hexagonal architecture:
//!
//! - **Domain Layer** (`risk_assessment`): Domain models, parsers and the scorer
//! - **Application Layer** (`application`): Collectors and use cases
//! - **Ports** (`ports`): Interface definitions for upstream sources and storage
//! - **Adapters** (`adapters`): HTTP clients, filesystem/in-memory stores, console output
//! - **Shared** (`shared`): Error types, exit codes and path safety helpers
//!
//! # Example
//!
//! ```no_run
//! use plugin_canary::prelude::*;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> Result<()> {
//! let store = FileSystemArtifactStore::new("data");
//! let use_case = CollectPluginUseCase::new(
//!     JenkinsPluginSiteClient::new(std::time::Duration::from_secs(30))?,
//!     store.clone(),
//!     StderrProgressReporter::new(),
//! );
//! let plugin_id = PluginId::new("workflow-cps")?;
//! use_case
//!     .execute(SnapshotRequest::new(plugin_id.clone(), CollectionMode::Curated))
//!     .await?;
//!
//! let as_of = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
//! let result = ScorePluginUseCase::new(store, BaselineScorer::default())
//!     .execute(ScoreRequest::new(plugin_id, as_of))?;
//! println!("{} scored {:.1}", result.plugin_id, result.score);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod risk_assessment;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::FileSystemArtifactStore;
    pub use crate::adapters::outbound::memory::InMemoryArtifactStore;
    pub use crate::adapters::outbound::network::{
        CachingAdvisoryPageSource, JenkinsAdvisoryClient, JenkinsPluginSiteClient,
        PluginHealthClient,
    };
    pub use crate::application::dto::{
        AdvisoryRequest, AdvisoryResponse, EnrichmentRequest, EnrichmentStage, EnrichmentSummary,
        EventBuildSummary, HealthCollectionSummary, HealthRequest, RegistryRequest,
        RegistryResponse, ScoreRequest, SnapshotRequest, SnapshotResponse,
    };
    pub use crate::application::pacing::RequestPacer;
    pub use crate::application::use_cases::{
        BuildAdvisoryEventsUseCase, CollectAdvisoriesUseCase, CollectHealthUseCase,
        CollectPluginUseCase, CollectRegistryUseCase, EnrichRegistryUseCase, ScorePluginUseCase,
    };
    pub use crate::ports::outbound::{
        AdvisoryPageSource, ArtifactKey, ArtifactStore, Dataset, HealthSource, ProgressReporter,
        RegistrySource, SnapshotSource, Stage,
    };
    pub use crate::risk_assessment::domain::{
        AdvisoryEvent, AdvisoryMode, AdvisoryRecord, CollectionMode, HealthRecord, PluginId,
        PluginSnapshot, RegistryEntry, ScoreResult, Severity, Vulnerability,
    };
    pub use crate::risk_assessment::services::{BaselineScorer, ScoringConfig};
    pub use crate::shared::Result;
}
