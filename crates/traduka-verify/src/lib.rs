//! Content verification primitives for downloaded model artifacts.
//!
//! Digests are computed incrementally as data streams through, so callers
//! never need to hold a whole artifact in memory. The catalog publishes
//! SHA-256 hex digests, and that is the only algorithm exposed here.

pub use self::digest::{digest_file, verify_file};
pub use self::error::{Result, VerifyError};
pub use self::hasher::Sha256Hasher;

mod digest;
mod error;
mod hasher;
