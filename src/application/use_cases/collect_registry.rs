use crate::application::artifacts::write_json;
use crate::application::collectors::{RegistryCollector, RegistryFetchOptions};
use crate::application::dto::{RegistryRequest, RegistryResponse};
use crate::application::pacing::RequestPacer;
use crate::ports::outbound::{ArtifactKey, ArtifactStore, Dataset, ProgressReporter, RegistrySource};
use crate::shared::Result;
use tracing::info;

/// CollectRegistryUseCase - Replaces the registry spine artifact
///
/// Entries are streamed line by line while pages arrive; the new spine
/// only replaces the previous one once the whole listing was read.
///
/// # Type Parameters
/// * `RS` - RegistrySource implementation
/// * `ST` - ArtifactStore implementation
/// * `PR` - ProgressReporter implementation
pub struct CollectRegistryUseCase<RS, ST, PR> {
    collector: RegistryCollector<RS>,
    store: ST,
    progress_reporter: PR,
}

impl<RS, ST, PR> CollectRegistryUseCase<RS, ST, PR>
where
    RS: RegistrySource,
    ST: ArtifactStore,
    PR: ProgressReporter,
{
    pub fn new(registry_source: RS, store: ST, progress_reporter: PR) -> Self {
        Self {
            collector: RegistryCollector::new(registry_source),
            store,
            progress_reporter,
        }
    }

    pub async fn execute(&self, request: RegistryRequest) -> Result<RegistryResponse> {
        request.validate()?;
        self.progress_reporter.report(&format!(
            "📚 Collecting plugin registry ({} mode)",
            request.mode
        ));

        let options = RegistryFetchOptions {
            page_size: request.page_size,
            max_plugins: request.max_plugins,
        };
        let pacer = RequestPacer::new(request.request_delay);
        let mut stream = self
            .store
            .open_stream(&ArtifactKey::dataset(Dataset::Registry))?;
        let fetch = self
            .collector
            .fetch_with(request.mode, options, &pacer, |entry| {
                stream.append_line(&serde_json::to_string(entry)?)
            })
            .await?;
        stream.commit()?;

        let raw_pages_saved = request.save_raw && !fetch.raw_pages.is_empty();
        if raw_pages_saved {
            write_json(
                &self.store,
                &ArtifactKey::dataset(Dataset::RegistryRaw),
                &fetch.raw_pages,
            )?;
        }

        for warning in &fetch.integrity_warnings {
            self.progress_reporter
                .report_error(&format!("⚠️  Duplicate registry entry dropped: {}", warning));
        }
        info!(
            entries = fetch.entries.len(),
            pages = fetch.raw_pages.len(),
            duplicates = fetch.integrity_warnings.len(),
            "registry collected"
        );
        self.progress_reporter.report_completion(&format!(
            "✅ Registry written: {} plugin(s)",
            fetch.entries.len()
        ));

        Ok(RegistryResponse {
            mode: request.mode,
            entries_written: fetch.entries.len(),
            pages_fetched: fetch.raw_pages.len(),
            integrity_warnings: fetch.integrity_warnings,
            invalid_items: fetch.invalid_items,
            raw_pages_saved,
        })
    }
}
