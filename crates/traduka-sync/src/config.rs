use std::time::Duration;

/// Catalog endpoint for the Mozilla translations model collection.
pub const MOZILLA_RECORDS_URL: &str = "https://firefox.settings.services.mozilla.com/v1/buckets/main-preview/collections/translations-models-v2/records";

/// CDN prefix that attachment locations are resolved against.
pub const MOZILLA_CDN_BASE: &str = "https://firefox-settings-attachments.cdn.mozilla.net/";

/// Immutable pipeline configuration.
///
/// Passed into [`Downloader`](crate::Downloader) at construction instead of
/// living in process-wide constants, so tests can point the pipeline at a
/// fake catalog and CDN.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// URL of the record catalog.
    pub records_url: String,

    /// Base prepended to `attachment.location` to form download URLs.
    pub cdn_base: String,

    /// Timeout for each network attempt, catalog and CDN alike.
    pub timeout: Duration,

    /// Total transfer attempts per record before it counts as failed.
    pub max_attempts: u32,

    /// Base delay for exponential backoff between transfer attempts.
    pub retry_backoff: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            records_url: MOZILLA_RECORDS_URL.to_string(),
            cdn_base: MOZILLA_CDN_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}
