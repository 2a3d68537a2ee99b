use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::dto::EnrichmentStage;
use crate::risk_assessment::domain::{CollectionMode, PluginId};

/// Gather ecosystem risk signals for Jenkins plugins and score them
#[derive(Parser, Debug)]
#[command(name = "canary")]
#[command(version)]
#[command(about = "Gather ecosystem risk signals for Jenkins plugins and score them", long_about = None)]
pub struct Args {
    /// Root directory for every collected artifact [default: data]
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to ./canary.config.yml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors; hide progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect one kind of upstream data
    Collect {
        #[command(subcommand)]
        target: CollectTarget,
    },
    /// Run snapshot, advisory and health collection over the registry
    Enrich(EnrichArgs),
    /// Build derived datasets from collected artifacts
    Build {
        #[command(subcommand)]
        target: BuildTarget,
    },
    /// Score one plugin from the stored artifacts
    Score(ScoreArgs),
}

#[derive(Subcommand, Debug)]
pub enum CollectTarget {
    /// Replace the registry of all plugins
    Registry(RegistryArgs),
    /// Collect one plugin's metadata snapshot (always replaces)
    Plugin(PluginArgs),
    /// Collect one plugin's security advisories
    Advisories(PluginArgs),
    /// Collect the bulk health dataset and split it per plugin
    Health(HealthArgs),
}

#[derive(Subcommand, Debug)]
pub enum BuildTarget {
    /// Rebuild the deduplicated advisory event stream
    Events,
}

#[derive(clap::Args, Debug)]
pub struct RegistryArgs {
    /// Fetch the live registry instead of the curated pilot set
    #[arg(long)]
    pub real: bool,

    /// Plugins per upstream page (1-5000)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Stop after this many unique plugins
    #[arg(long, value_name = "N")]
    pub max_plugins: Option<usize>,

    /// Also store the upstream pages exactly as received
    #[arg(long)]
    pub save_raw: bool,
}

#[derive(clap::Args, Debug)]
pub struct PluginArgs {
    /// Plugin id, e.g. workflow-cps
    #[arg(long, value_parser = parse_plugin_id)]
    pub id: PluginId,

    /// Use live upstream data instead of the curated/sample records
    #[arg(long)]
    pub real: bool,
}

#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Refetch the export and rewrite existing per-plugin artifacts
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(clap::Args, Debug)]
pub struct EnrichArgs {
    /// Use live upstream data instead of the curated/sample records
    #[arg(long)]
    pub real: bool,

    /// Comma-separated stages to run (snapshot,advisories,health)
    #[arg(long, value_delimiter = ',', value_name = "STAGES")]
    pub stages: Vec<EnrichmentStage>,

    /// Re-run stages whose artifacts already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Minimum delay between upstream requests in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Bound on plugins that still have work to do
    #[arg(long, value_name = "N")]
    pub max_plugins: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct ScoreArgs {
    /// Plugin id to score
    #[arg(value_parser = parse_plugin_id)]
    pub plugin: PluginId,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Reference date for age-based features (YYYY-MM-DD) [default: today, UTC]
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Collection mode selected by a `--real` flag
pub fn mode(real: bool) -> CollectionMode {
    if real {
        CollectionMode::Real
    } else {
        CollectionMode::Curated
    }
}

fn parse_plugin_id(value: &str) -> Result<PluginId, String> {
    PluginId::new(value).map_err(|e| e.to_string())
}
