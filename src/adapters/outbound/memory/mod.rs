/// In-memory adapters for deterministic tests and dry runs
mod artifact_store;

pub use artifact_store::InMemoryArtifactStore;
