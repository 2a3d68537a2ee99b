use chrono::Utc;
use owo_colors::OwoColorize;
use plugin_canary::adapters::outbound::console::StderrProgressReporter;
use plugin_canary::adapters::outbound::filesystem::FileSystemArtifactStore;
use plugin_canary::adapters::outbound::network::{
    CachingAdvisoryPageSource, JenkinsAdvisoryClient, JenkinsPluginSiteClient, PluginHealthClient,
};
use plugin_canary::application::dto::{
    AdvisoryRequest, EnrichmentRequest, HealthRequest, RegistryRequest, ScoreRequest,
    SnapshotRequest,
};
use plugin_canary::application::pacing::RequestPacer;
use plugin_canary::application::use_cases::{
    BuildAdvisoryEventsUseCase, CollectAdvisoriesUseCase, CollectHealthUseCase,
    CollectPluginUseCase, CollectRegistryUseCase, EnrichRegistryUseCase, ScorePluginUseCase,
};
use plugin_canary::cli::{self, Args, BuildTarget, CollectTarget, Command, EnrichArgs, ScoreArgs};
use plugin_canary::config::{self, Settings};
use plugin_canary::risk_assessment::domain::{AdvisoryMode, ScoreResult, Severity};
use plugin_canary::risk_assessment::services::BaselineScorer;
use plugin_canary::shared::error::ExitCode;
use plugin_canary::shared::Result;
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_tracing(&args);

    match run(args).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

/// RUST_LOG wins; otherwise -v and -q pick the level.
fn init_tracing(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config_file = match args.config.as_deref() {
        Some(path) => Some(config::load_config_from_path(path)?),
        None => config::discover_config(Path::new("."))?,
    };
    let mut settings = Settings::from_config(config_file)?;
    if let Some(data_dir) = args.data_dir.clone() {
        settings.data_dir = data_dir;
    }
    debug!(
        data_dir = %settings.data_dir.display(),
        delay_ms = settings.request_delay_ms,
        timeout_secs = settings.timeout_secs,
        "settings resolved"
    );

    let store = FileSystemArtifactStore::new(settings.data_dir.clone());
    let timeout = Duration::from_secs(settings.timeout_secs);
    let reporter = || {
        if args.quiet {
            StderrProgressReporter::quiet()
        } else {
            StderrProgressReporter::new()
        }
    };

    match args.command {
        Command::Collect { target } => match target {
            CollectTarget::Registry(registry) => {
                let mut request = RegistryRequest::new(cli::mode(registry.real));
                request.page_size = registry.page_size.unwrap_or(settings.registry_page_size);
                request.max_plugins = registry.max_plugins.or(settings.max_plugins);
                request.save_raw = registry.save_raw;
                request.request_delay = Duration::from_millis(settings.request_delay_ms);

                let use_case = CollectRegistryUseCase::new(
                    JenkinsPluginSiteClient::new(timeout)?,
                    store,
                    reporter(),
                );
                let response = use_case.execute(request).await?;
                println!(
                    "registry ({}): {} plugin(s) from {} page(s), {} duplicate id(s), {} invalid item(s)",
                    response.mode,
                    response.entries_written,
                    response.pages_fetched,
                    response.integrity_warnings.len(),
                    response.invalid_items
                );
                Ok(ExitCode::Success)
            }
            CollectTarget::Plugin(plugin) => {
                let use_case = CollectPluginUseCase::new(
                    JenkinsPluginSiteClient::new(timeout)?,
                    store,
                    reporter(),
                );
                let response = use_case
                    .execute(SnapshotRequest::new(plugin.id, cli::mode(plugin.real)))
                    .await?;
                println!(
                    "snapshot {} ({}): dependencies={} security_warnings={}{}",
                    response.snapshot.plugin_id,
                    response.snapshot.mode,
                    response.snapshot.dependencies.len(),
                    response.snapshot.security_warnings.len(),
                    if response.replaced_existing {
                        ", replaced existing"
                    } else {
                        ""
                    }
                );
                Ok(ExitCode::Success)
            }
            CollectTarget::Advisories(plugin) => {
                let mode = AdvisoryMode::from(cli::mode(plugin.real));
                let use_case = CollectAdvisoriesUseCase::new(
                    CachingAdvisoryPageSource::new(JenkinsAdvisoryClient::new(timeout)?),
                    store,
                    reporter(),
                    RequestPacer::new(Duration::from_millis(settings.request_delay_ms)),
                )?;
                let response = use_case
                    .execute(AdvisoryRequest::new(plugin.id, mode))
                    .await?;
                println!(
                    "advisories {} ({}): {} record(s), {} vulnerabilities, {} source failure(s)",
                    response.plugin_id,
                    response.mode,
                    response.records.len(),
                    response.vulnerability_count(),
                    response.failures.len()
                );
                for failure in &response.failures {
                    println!("  - {}", failure);
                }
                if response.persisted {
                    Ok(ExitCode::Success)
                } else {
                    Ok(ExitCode::CompletedWithFailures)
                }
            }
            CollectTarget::Health(health) => {
                let use_case = CollectHealthUseCase::new(
                    PluginHealthClient::new(timeout)?,
                    store,
                    reporter(),
                );
                let summary = use_case
                    .execute(HealthRequest {
                        overwrite: health.overwrite || settings.overwrite,
                    })
                    .await?;
                println!(
                    "health: {} written, {} skipped, {} unusable, {} failed",
                    summary.written,
                    summary.skipped,
                    summary.unusable,
                    summary.failures.len()
                );
                if summary.failures.is_empty() {
                    Ok(ExitCode::Success)
                } else {
                    Ok(ExitCode::CompletedWithFailures)
                }
            }
        },
        Command::Enrich(enrich) => {
            let request = enrichment_request(&enrich, &settings);
            let use_case = EnrichRegistryUseCase::new(
                JenkinsPluginSiteClient::new(timeout)?,
                CachingAdvisoryPageSource::new(JenkinsAdvisoryClient::new(timeout)?),
                PluginHealthClient::new(timeout)?,
                store,
                reporter(),
            )?;
            let summary = use_case.execute(request).await?;

            println!(
                "enrich run {} ({}): {} plugin(s), {} processed, {} deferred",
                summary.run_id,
                summary.mode,
                summary.plugins_total,
                summary.plugins_processed,
                summary.plugins_deferred
            );
            for (stage, counts) in &summary.stages {
                println!(
                    "  {:<10} completed={} skipped={} failed={}",
                    stage.as_str(),
                    counts.completed,
                    counts.skipped,
                    counts.failed
                );
            }
            for failure in &summary.failures {
                println!(
                    "  ✗ {} [{}] {}: {}",
                    failure.plugin_id,
                    failure.stage.as_str(),
                    failure.kind,
                    failure.message
                );
            }
            if summary.has_failures() {
                Ok(ExitCode::CompletedWithFailures)
            } else {
                Ok(ExitCode::Success)
            }
        }
        Command::Build {
            target: BuildTarget::Events,
        } => {
            let summary = BuildAdvisoryEventsUseCase::new(store, reporter()).execute()?;
            println!(
                "events: {} from {} record(s) in {} artifact(s), {} malformed line(s) skipped",
                summary.events_written,
                summary.records_read,
                summary.artifacts_read,
                summary.malformed_lines
            );
            Ok(ExitCode::Success)
        }
        Command::Score(score) => {
            let as_of = score.as_of.unwrap_or_else(|| Utc::now().date_naive());
            let use_case = ScorePluginUseCase::new(store, BaselineScorer::new(settings.scoring));
            let result = use_case.execute(ScoreRequest::new(score.plugin.clone(), as_of))?;
            print_score(&score, &result)?;
            Ok(ExitCode::Success)
        }
    }
}

fn enrichment_request(enrich: &EnrichArgs, settings: &Settings) -> EnrichmentRequest {
    let mut request = EnrichmentRequest::new(cli::mode(enrich.real));
    request.stages = if enrich.stages.is_empty() {
        settings.stages.iter().copied().collect()
    } else {
        enrich.stages.iter().copied().collect()
    };
    request.overwrite = enrich.overwrite || settings.overwrite;
    request.request_delay =
        Duration::from_millis(enrich.delay_ms.unwrap_or(settings.request_delay_ms));
    request.max_plugins = enrich.max_plugins.or(settings.max_plugins);
    request
}

fn print_score(args: &ScoreArgs, result: &ScoreResult) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let color = std::io::stdout().is_terminal();
    let severity = result
        .max_severity
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    let severity = match (color, result.max_severity) {
        (true, Some(Severity::Critical)) => severity.red().bold().to_string(),
        (true, Some(Severity::High)) => severity.red().to_string(),
        (true, Some(Severity::Medium)) => severity.yellow().to_string(),
        (true, _) => severity.green().to_string(),
        (false, _) => severity,
    };

    println!("{}", result.plugin_id);
    println!("  score:        {:.1}", result.score);
    println!("  max severity: {}", severity);
    if result.reasons.is_empty() {
        println!("  reasons:      (none)");
    } else {
        println!("  reasons:");
        for reason in &result.reasons {
            println!("    - {}", reason);
        }
    }
    Ok(())
}
