use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::error::{Result, VerifyError};
use crate::hasher::Sha256Hasher;

const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 hex digest of a file, reading it in fixed-size chunks.
pub async fn digest_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize_hex())
}

/// Check a file against an expected hex digest.
///
/// Comparison is case-insensitive over the hex alphabet; the mismatch error
/// carries both digests for diagnostics.
pub async fn verify_file(path: &Path, expected: &str) -> Result<()> {
    let actual = digest_file(path).await?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}
