use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::Semaphore;
use traduka_codec::Decompressor;
use traduka_fetch::{Fetcher, HttpClient};

use crate::catalog;
use crate::config::SyncConfig;
use crate::error::{CatalogError, SetupError};
use crate::pipeline::{Outcome, RecordPipeline};
use crate::record::ModelRecord;

#[cfg(feature = "reqwest")]
use traduka_fetch::ReqwestClient;

/// Aggregate counters over one `download_all` run. Every submitted record
/// lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadReport {
    /// Callers commonly map this to a non-zero process exit status.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Cooperative cancellation flag shared with a running `download_all`.
///
/// Cancelling stops new record pipelines from starting; in-flight pipelines
/// run to their terminal state (including failure cleanup). Records that
/// never start are not counted.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-record terminal-state notifications for the UI layer.
#[derive(Debug)]
pub enum RecordEvent<'a> {
    Started { record: &'a ModelRecord },
    Finished { record: &'a ModelRecord, outcome: &'a Outcome },
}

pub type EventHandler = Arc<dyn Fn(RecordEvent<'_>) + Send + Sync>;

/// Options for one `download_all` run.
pub struct DownloadOptions {
    /// Root of the on-disk model layout; created when absent.
    pub model_dir: PathBuf,
    /// Upper bound on simultaneously running record pipelines.
    pub concurrency: usize,
    /// Observer for per-record lifecycle events.
    pub on_event: Option<EventHandler>,
    /// Optional cooperative cancellation signal.
    pub cancel: Option<CancelToken>,
}

impl DownloadOptions {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            concurrency: 4,
            on_event: None,
            cancel: None,
        }
    }

    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn on_event(mut self, handler: EventHandler) -> Self {
        self.on_event = Some(handler);
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("model_dir", &self.model_dir)
            .field("concurrency", &self.concurrency)
            .field("on_event", &self.on_event.as_ref().map(|_| "{ ... }"))
            .field("cancel", &self.cancel.as_ref().map(|c| c.is_cancelled()))
            .finish()
    }
}

/// The download orchestrator: owns the catalog/CDN configuration, the HTTP
/// fetcher, and the decompression strategy picked at construction.
pub struct Downloader<C> {
    config: SyncConfig,
    fetcher: Fetcher<C>,
    decompressor: Arc<dyn Decompressor>,
}

#[cfg(feature = "reqwest")]
impl Downloader<ReqwestClient> {
    /// Production constructor: reqwest client bounded by the configured
    /// per-attempt timeout, decompressor chosen once for the process.
    pub fn new(config: SyncConfig) -> Result<Self, SetupError> {
        let client =
            ReqwestClient::new(config.timeout).map_err(|e| SetupError::Http(e.to_string()))?;
        let decompressor = traduka_codec::detect()?;
        Ok(Self::with_client(config, client, decompressor))
    }
}

impl<C: HttpClient> Downloader<C> {
    /// Construct with an explicit client and decompressor. This is the test
    /// seam: substitute an in-memory `HttpClient` to fake the catalog and
    /// the CDN.
    pub fn with_client(
        config: SyncConfig,
        client: C,
        decompressor: Arc<dyn Decompressor>,
    ) -> Self {
        let fetcher = Fetcher::new(client, config.max_attempts, config.retry_backoff);
        Self {
            config,
            fetcher,
            decompressor,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetch and decode the full catalog, in catalog order.
    pub async fn fetch_catalog(&self) -> Result<Vec<ModelRecord>, CatalogError> {
        catalog::fetch_catalog(self.fetcher.client(), &self.config.records_url).await
    }

    /// Drive every record to a terminal state, at most `concurrency` at a
    /// time, and aggregate the outcomes.
    ///
    /// Individual record failures never propagate; they only increment the
    /// failed counter (and reach the event callback). The only error here is
    /// failing to create the model directory itself.
    pub async fn download_all(
        &self,
        records: Vec<ModelRecord>,
        options: &DownloadOptions,
    ) -> std::io::Result<DownloadReport> {
        tokio::fs::create_dir_all(&options.model_dir).await?;

        let downloaded = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

        let mut tasks = FuturesUnordered::new();
        for record in records {
            let semaphore = Arc::clone(&semaphore);
            let (downloaded, skipped, failed) = (&downloaded, &skipped, &failed);
            tasks.push(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if options
                    .cancel
                    .as_ref()
                    .is_some_and(CancelToken::is_cancelled)
                {
                    tracing::info!(record = %record.name, "cancelled before start");
                    return;
                }

                if let Some(handler) = &options.on_event {
                    handler(RecordEvent::Started { record: &record });
                }

                let outcome = RecordPipeline::new(
                    &record,
                    &self.config,
                    &self.fetcher,
                    Arc::clone(&self.decompressor),
                    &options.model_dir,
                )
                .run()
                .await;

                match &outcome {
                    Outcome::Downloaded => {
                        downloaded.fetch_add(1, Ordering::Relaxed);
                    }
                    Outcome::Skipped => {
                        skipped.fetch_add(1, Ordering::Relaxed);
                    }
                    Outcome::Failed(err) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        tracing::error!(record = %record.name, error = %err, "record failed");
                    }
                }

                if let Some(handler) = &options.on_event {
                    handler(RecordEvent::Finished {
                        record: &record,
                        outcome: &outcome,
                    });
                }
            });
        }

        while tasks.next().await.is_some() {}

        Ok(DownloadReport {
            downloaded: downloaded.load(Ordering::Relaxed),
            skipped: skipped.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        })
    }
}
