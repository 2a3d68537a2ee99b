//! Per-source collectors. Each one is a function of (identifier, mode,
//! existing artifact) and never writes to the store on its own, except
//! for the shared health dataset cache.
mod advisory;
mod health;
mod registry;
mod snapshot;

pub use advisory::AdvisoryCollector;
pub use health::HealthCollector;
pub use registry::{RegistryCollector, RegistryFetch, RegistryFetchOptions};
pub use snapshot::SnapshotCollector;
