pub mod advisory_page_parser;
pub mod baseline_scorer;
pub mod cvss;
mod event_normalizer;
pub mod health_parser;
pub mod registry_spine;
pub mod snapshot_parser;
pub mod url_canonicalizer;

pub use advisory_page_parser::{AdvisoryPageParser, AdvisorySection, ParsedAdvisoryPage};
pub use baseline_scorer::{BaselineScorer, ScoringConfig, ScoringInputs};
pub use event_normalizer::EventNormalizer;
pub use health_parser::parse_health_dataset;
pub use registry_spine::{RegistryPage, RegistrySpine};
pub use snapshot_parser::parse_plugin_payload;
pub use url_canonicalizer::{canonicalize, CanonicalUrl, CanonicalizationError};
