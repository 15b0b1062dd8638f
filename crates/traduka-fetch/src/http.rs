use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream of response-body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// The minimal interface the pipeline needs: one buffered GET (catalog
/// payloads are small) and one streaming GET (attachments are not).
/// Implementations handle their own timeout configuration and map non-success
/// HTTP statuses to their error type.
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// GET a URL and buffer the whole body.
    fn get_bytes(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Bytes, Self::Error>> + Send;

    /// GET a URL and return the body as a chunk stream.
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<
        Output = std::result::Result<
            BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            Self::Error,
        >,
    > + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use super::*;
    use crate::error::{FetchError, Result};

    /// Production HTTP client backed by `reqwest`.
    ///
    /// The timeout passed to [`ReqwestClient::new`] bounds each whole request,
    /// headers through body, so one stalled transfer cannot hang a pipeline
    /// indefinitely.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new(timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get_bytes(&self, url: &str) -> std::result::Result<Bytes, Self::Error> {
            self.client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await
        }

        async fn stream(
            &self,
            url: &str,
        ) -> std::result::Result<
            BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            Self::Error,
        > {
            let response = self.client.get(url).send().await?.error_for_status()?;
            Ok(Box::pin(response.bytes_stream()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
