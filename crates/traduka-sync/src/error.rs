//! Error taxonomy: catalog failures abort the run, record failures are
//! contained in the per-record pipeline and only surface as counters.

use std::io;

use thiserror::Error;
use traduka_codec::CodecError;
use traduka_fetch::FetchError;

/// Fatal failure retrieving or decoding the catalog. No partial record list
/// is usable; the caller aborts.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Network(String),

    #[error("catalog payload malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Per-record failure. Never aborts sibling records; aggregated into the
/// failed counter and carried in the `Failed` outcome for event subscribers.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("download failed: {0}")]
    Download(#[from] FetchError),

    #[error("compressed artifact digest mismatch: expected {expected}, got {actual}")]
    CompressedDigest { expected: String, actual: String },

    #[error("decompressed artifact digest mismatch: expected {expected}, got {actual}")]
    DecompressedDigest { expected: String, actual: String },

    #[error("decompression failed: {0}")]
    Decompress(#[from] CodecError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure constructing a [`Downloader`](crate::Downloader).
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("HTTP client setup failed: {0}")]
    Http(String),

    #[error("decompressor setup failed: {0}")]
    Codec(#[from] CodecError),
}
