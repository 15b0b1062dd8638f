//! Per-record download pipeline.
//!
//! Expressed as an explicit state machine rather than straight-line code with
//! early returns: every failure names its cleanup scope, so reordering or
//! adding states cannot silently skip the removal of a bad artifact.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use traduka_codec::Decompressor;
use traduka_fetch::{Fetcher, HttpClient};
use traduka_verify::{VerifyError, verify_file};

use crate::config::SyncConfig;
use crate::error::RecordError;
use crate::record::ModelRecord;

/// Terminal state of one record's pipeline. Each maps to exactly one
/// aggregate counter.
#[derive(Debug)]
pub enum Outcome {
    /// Fetched, verified, and decompressed in this run.
    Downloaded,
    /// A valid decompressed artifact was already on disk; no network activity.
    Skipped,
    /// Contained failure; any offending artifact has been removed.
    Failed(RecordError),
}

/// Non-terminal pipeline states, visited strictly in order.
enum Step {
    CheckExisting,
    Download,
    VerifyCompressed { digest: String },
    Decompress,
    VerifyDecompressed,
    Cleanup,
}

enum Transition {
    Next(Step),
    Done(Outcome),
}

/// Which on-disk artifacts a failure invalidates.
enum CleanupScope {
    None,
    Compressed,
    Both,
}

struct StepFailure {
    error: RecordError,
    scope: CleanupScope,
}

impl StepFailure {
    fn new(error: impl Into<RecordError>, scope: CleanupScope) -> Self {
        Self {
            error: error.into(),
            scope,
        }
    }
}

pub(crate) struct RecordPipeline<'a, C> {
    record: &'a ModelRecord,
    config: &'a SyncConfig,
    fetcher: &'a Fetcher<C>,
    decompressor: Arc<dyn Decompressor>,
    lang_dir: PathBuf,
    compressed: PathBuf,
    decompressed: PathBuf,
}

impl<'a, C: HttpClient> RecordPipeline<'a, C> {
    pub(crate) fn new(
        record: &'a ModelRecord,
        config: &'a SyncConfig,
        fetcher: &'a Fetcher<C>,
        decompressor: Arc<dyn Decompressor>,
        model_dir: &Path,
    ) -> Self {
        let lang_dir = model_dir.join(record.language_pair());
        let compressed = lang_dir.join(&record.attachment.filename);
        let decompressed = lang_dir.join(record.decompressed_filename());
        Self {
            record,
            config,
            fetcher,
            decompressor,
            lang_dir,
            compressed,
            decompressed,
        }
    }

    /// Drive the record to a terminal state.
    pub(crate) async fn run(&self) -> Outcome {
        if let Err(err) = tokio::fs::create_dir_all(&self.lang_dir).await {
            return Outcome::Failed(RecordError::Io(err));
        }

        let mut step = Step::CheckExisting;
        loop {
            let result = match step {
                Step::CheckExisting => self.check_existing().await,
                Step::Download => self.download().await,
                Step::VerifyCompressed { ref digest } => self.verify_compressed(digest),
                Step::Decompress => self.decompress().await,
                Step::VerifyDecompressed => self.verify_decompressed().await,
                Step::Cleanup => self.cleanup().await,
            };
            match result {
                Ok(Transition::Next(next)) => step = next,
                Ok(Transition::Done(outcome)) => return outcome,
                Err(failure) => {
                    self.remove_artifacts(failure.scope).await;
                    return Outcome::Failed(failure.error);
                }
            }
        }
    }

    /// Skip the record when a decompressed artifact with the declared digest
    /// already exists. A digest mismatch is a stale artifact, not an error;
    /// a record that declares no decompressed digest is always re-fetched
    /// because there is nothing to trust the existing file against.
    async fn check_existing(&self) -> Result<Transition, StepFailure> {
        let exists = tokio::fs::try_exists(&self.decompressed)
            .await
            .map_err(|e| StepFailure::new(e, CleanupScope::None))?;
        if !exists {
            return Ok(Transition::Next(Step::Download));
        }

        if let Some(expected) = &self.record.decompressed_hash {
            match verify_file(&self.decompressed, expected).await {
                Ok(()) => {
                    tracing::info!(record = %self.record.name, "already present, skipping");
                    return Ok(Transition::Done(Outcome::Skipped));
                }
                Err(VerifyError::Mismatch { .. }) => {}
                Err(VerifyError::Io(err)) => {
                    return Err(StepFailure::new(err, CleanupScope::None));
                }
            }
        }

        tracing::warn!(
            record = %self.record.name,
            path = %self.decompressed.display(),
            "existing artifact failed verification, re-fetching"
        );
        Ok(Transition::Next(Step::Download))
    }

    /// Fetch the compressed attachment; the fetcher retries whole transfers
    /// and hands back the digest of the bytes it wrote.
    async fn download(&self) -> Result<Transition, StepFailure> {
        let url = self.record.download_url(&self.config.cdn_base);
        tracing::info!(record = %self.record.name, %url, "downloading");
        match self.fetcher.download(&url, &self.compressed).await {
            Ok(digest) => Ok(Transition::Next(Step::VerifyCompressed { digest })),
            Err(err) => Err(StepFailure::new(err, CleanupScope::Compressed)),
        }
    }

    /// Compare the transmitted bytes against the published attachment hash.
    /// Unverified bytes are never decompressed.
    fn verify_compressed(&self, digest: &str) -> Result<Transition, StepFailure> {
        let expected = &self.record.attachment.hash;
        if digest.eq_ignore_ascii_case(expected) {
            Ok(Transition::Next(Step::Decompress))
        } else {
            Err(StepFailure::new(
                RecordError::CompressedDigest {
                    expected: expected.clone(),
                    actual: digest.to_string(),
                },
                CleanupScope::Compressed,
            ))
        }
    }

    async fn decompress(&self) -> Result<Transition, StepFailure> {
        let decompressor = self.decompressor.clone();
        let input = self.compressed.clone();
        let output = self.decompressed.clone();
        let result =
            tokio::task::spawn_blocking(move || decompressor.decompress(&input, &output)).await;

        match result {
            Ok(Ok(())) => {
                if self.record.decompressed_hash.is_some() {
                    Ok(Transition::Next(Step::VerifyDecompressed))
                } else {
                    // Catalog declared no decompressed digest: verification is
                    // treated as passed. Transport integrity was checked, but
                    // the decompressed content itself goes untrusted here.
                    Ok(Transition::Next(Step::Cleanup))
                }
            }
            // A failed decode can leave a partial output file; remove it along
            // with the compressed input so no corrupt artifact survives.
            Ok(Err(err)) => Err(StepFailure::new(err, CleanupScope::Both)),
            Err(join_err) => Err(StepFailure::new(
                RecordError::Io(io::Error::other(join_err)),
                CleanupScope::Both,
            )),
        }
    }

    async fn verify_decompressed(&self) -> Result<Transition, StepFailure> {
        let Some(expected) = &self.record.decompressed_hash else {
            return Ok(Transition::Next(Step::Cleanup));
        };
        match verify_file(&self.decompressed, expected).await {
            Ok(()) => Ok(Transition::Next(Step::Cleanup)),
            Err(VerifyError::Mismatch { expected, actual }) => Err(StepFailure::new(
                RecordError::DecompressedDigest { expected, actual },
                CleanupScope::Both,
            )),
            Err(VerifyError::Io(err)) => Err(StepFailure::new(err, CleanupScope::Both)),
        }
    }

    /// Drop the now-redundant compressed file and stamp the record's
    /// last-modified time onto the decompressed artifact.
    async fn cleanup(&self) -> Result<Transition, StepFailure> {
        if let Err(err) = tokio::fs::remove_file(&self.compressed).await
            && err.kind() != io::ErrorKind::NotFound
        {
            tracing::debug!(
                path = %self.compressed.display(),
                error = %err,
                "could not remove compressed artifact"
            );
        }

        let mtime =
            SystemTime::UNIX_EPOCH + Duration::from_millis(self.record.last_modified);
        let path = self.decompressed.clone();
        let stamped = tokio::task::spawn_blocking(move || {
            let file = std::fs::File::options().write(true).open(&path)?;
            file.set_modified(mtime)
        })
        .await;
        match stamped {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(StepFailure::new(err, CleanupScope::None)),
            Err(join_err) => {
                return Err(StepFailure::new(
                    RecordError::Io(io::Error::other(join_err)),
                    CleanupScope::None,
                ));
            }
        }

        tracing::info!(record = %self.record.name, "completed");
        Ok(Transition::Done(Outcome::Downloaded))
    }

    /// Best-effort removal of invalidated artifacts. Failure to remove is
    /// logged, not surfaced; the digest check on the next run refuses a
    /// leftover file anyway.
    async fn remove_artifacts(&self, scope: CleanupScope) {
        let targets: Vec<&PathBuf> = match scope {
            CleanupScope::None => Vec::new(),
            CleanupScope::Compressed => vec![&self.compressed],
            CleanupScope::Both => vec![&self.compressed, &self.decompressed],
        };
        for path in targets {
            if let Err(err) = tokio::fs::remove_file(path).await
                && err.kind() != io::ErrorKind::NotFound
            {
                tracing::warn!(path = %path.display(), error = %err, "cleanup failed");
            }
        }
    }
}
