/// Network adapters for the Jenkins upstream APIs
mod caching_advisory_source;
mod http;
mod jenkins_advisory;
mod jenkins_plugin_site;
mod plugin_health;

pub use caching_advisory_source::CachingAdvisoryPageSource;
pub use http::{HttpClient, DEFAULT_TIMEOUT_SECS};
pub use jenkins_advisory::JenkinsAdvisoryClient;
pub use jenkins_plugin_site::JenkinsPluginSiteClient;
pub use plugin_health::PluginHealthClient;
