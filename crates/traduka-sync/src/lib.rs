//! Acquisition pipeline for remotely catalogued translation models.
//!
//! The Mozilla translations catalog lists versioned, zstd-compressed model
//! artifacts with published digests for both the transmitted and the
//! decompressed bytes. This crate fetches the catalog, filters records by
//! architecture, and drives a per-record pipeline (existence check,
//! download, compressed-digest verification, decompression,
//! decompressed-digest verification, cleanup) concurrently across a bounded
//! worker set, idempotently across runs.
//!
//! The crate emits no console output. Callers observe progress through the
//! optional per-record event callback on [`DownloadOptions`] and decide the
//! process exit status from the returned [`DownloadReport`].

mod catalog;
mod config;
mod downloader;
mod error;
mod pipeline;
mod record;

pub use config::{MOZILLA_CDN_BASE, MOZILLA_RECORDS_URL, SyncConfig};
pub use downloader::{
    CancelToken, DownloadOptions, DownloadReport, Downloader, EventHandler, RecordEvent,
};
pub use error::{CatalogError, RecordError, SetupError};
pub use pipeline::Outcome;
pub use record::{Attachment, FileType, ModelRecord, select_by_architecture};
