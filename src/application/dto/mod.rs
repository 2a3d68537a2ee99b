/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod collection_request;
mod collection_response;
mod enrichment;

pub use collection_request::{
    AdvisoryRequest, HealthRequest, RegistryRequest, ScoreRequest, SnapshotRequest,
};
pub use collection_response::{
    AdvisoryResponse, EventBuildSummary, HealthCollectionSummary, RegistryResponse,
    SnapshotResponse,
};
pub use enrichment::{
    AdvisorySourceFailure, EnrichmentRequest, EnrichmentStage, EnrichmentSummary, StageCounts,
    StageFailure,
};
