/// Use cases module containing application business logic orchestration
mod build_advisory_events;
mod collect_advisories;
mod collect_health;
mod collect_plugin;
mod collect_registry;
mod enrich_registry;
mod score_plugin;

pub use build_advisory_events::BuildAdvisoryEventsUseCase;
pub use collect_advisories::CollectAdvisoriesUseCase;
pub use collect_health::CollectHealthUseCase;
pub use collect_plugin::CollectPluginUseCase;
pub use collect_registry::CollectRegistryUseCase;
pub use enrich_registry::EnrichRegistryUseCase;
pub use score_plugin::ScorePluginUseCase;
