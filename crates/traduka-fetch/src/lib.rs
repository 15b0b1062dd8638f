//! HTTP fetching with bounded retry and single-pass digesting.
//!
//! The [`HttpClient`] trait is the only seam to the network: production code
//! uses the `reqwest`-backed [`ReqwestClient`], tests substitute an in-memory
//! implementation. [`Fetcher`] streams a response body to disk while feeding
//! a SHA-256 hasher, so the transmitted bytes are digested without a second
//! read, and retries the whole transfer (never a byte range) up to a bounded
//! attempt count.

mod error;
mod fetcher;
mod http;
mod retry;

pub use error::{FetchError, Result};
pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient};
pub use retry::retry_delay;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
