use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use traduka_verify::Sha256Hasher;

use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::retry::retry_delay;

/// Downloads URLs to files with bounded whole-transfer retry.
///
/// Each attempt streams the response body to the destination while feeding a
/// SHA-256 hasher, so the digest of the transmitted bytes falls out of the
/// download itself. A failed attempt is retried from byte zero; after the
/// attempt ceiling is reached the partial file is removed and the last error
/// is surfaced.
pub struct Fetcher<C> {
    client: C,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl<C: HttpClient> Fetcher<C> {
    /// `max_attempts` counts total transfer attempts, not just retries, and
    /// is clamped to at least one.
    pub fn new(client: C, max_attempts: u32, retry_backoff: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_backoff,
        }
    }

    /// The underlying HTTP client, for one-shot requests that need no retry.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch `url` into `dest`, returning the hex SHA-256 of the bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_download(url, dest).await {
                Ok(digest) => return Ok(digest),
                Err(err) if attempt < self.max_attempts => {
                    tracing::warn!(
                        url,
                        attempt,
                        max = self.max_attempts,
                        error = %err,
                        "transfer failed, retrying"
                    );
                    tokio::time::sleep(retry_delay(attempt - 1, self.retry_backoff)).await;
                }
                Err(err) => {
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        last: err.to_string(),
                    });
                }
            }
        }
    }

    async fn try_download(&self, url: &str, dest: &Path) -> Result<String> {
        let mut stream = self
            .client
            .stream(url)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let mut hasher = Sha256Hasher::new();
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Network(e.to_string()))?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(hasher.finalize_hex())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use bytes::Bytes;
    use futures_util::stream;

    use super::*;
    use crate::http::BoxStream;

    #[derive(Debug, thiserror::Error)]
    #[error("mock failure: {0}")]
    struct MockError(String);

    /// Fails the first `failures` streaming requests, then serves `body`.
    struct FlakyClient {
        body: Bytes,
        failures: u32,
        calls: AtomicU32,
    }

    impl HttpClient for FlakyClient {
        type Error = MockError;

        async fn get_bytes(&self, _url: &str) -> std::result::Result<Bytes, MockError> {
            Ok(self.body.clone())
        }

        async fn stream(
            &self,
            _url: &str,
        ) -> std::result::Result<BoxStream<'static, std::result::Result<Bytes, MockError>>, MockError>
        {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(MockError(format!("connection reset (call {call})")));
            }
            let chunks = vec![Ok(self.body.clone())];
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    #[tokio::test]
    async fn download_writes_file_and_returns_digest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("payload.bin");
        let client = FlakyClient {
            body: Bytes::from_static(b"model bytes"),
            failures: 0,
            calls: AtomicU32::new(0),
        };

        let fetcher = Fetcher::new(client, 3, Duration::ZERO);
        let digest = fetcher.download("http://cdn/payload", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"model bytes");
        assert_eq!(digest, Sha256Hasher::digest_hex(b"model bytes"));
    }

    #[tokio::test]
    async fn download_retries_transient_failures() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("payload.bin");
        let client = FlakyClient {
            body: Bytes::from_static(b"eventually"),
            failures: 2,
            calls: AtomicU32::new(0),
        };

        let fetcher = Fetcher::new(client, 3, Duration::ZERO);
        fetcher.download("http://cdn/payload", &dest).await.unwrap();

        assert_eq!(fetcher.client().calls.load(Ordering::SeqCst), 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"eventually");
    }

    #[tokio::test]
    async fn download_gives_up_after_attempt_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("payload.bin");
        let client = FlakyClient {
            body: Bytes::from_static(b"unreachable"),
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };

        let fetcher = Fetcher::new(client, 3, Duration::ZERO);
        let err = fetcher
            .download("http://cdn/payload", &dest)
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dest.exists(), "partial file must be cleaned up");
    }
}
