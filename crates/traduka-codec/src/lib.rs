//! Zstd decompression behind a strategy trait.
//!
//! Catalog attachments are zstd frames. Two interchangeable implementations
//! exist: [`LibZstd`] decodes in-process with a streaming `zstd` decoder
//! (default `zstd` feature), and [`CliZstd`] shells out to an installed
//! `zstd` binary. [`detect`] picks one once at startup; the pipeline stays
//! agnostic to the choice. Both stream, so artifact size never dictates
//! memory use.

pub use self::error::{CodecError, Result};

mod error;

use std::path::Path;
#[cfg(not(feature = "zstd"))]
use std::path::PathBuf;
use std::sync::Arc;

/// A zstd decompressor writing a compressed input out to a destination path.
pub trait Decompressor: Send + Sync {
    fn decompress(&self, input: &Path, output: &Path) -> Result<()>;
}

/// In-process streaming decoder.
#[cfg(feature = "zstd")]
pub struct LibZstd;

#[cfg(feature = "zstd")]
impl Decompressor for LibZstd {
    fn decompress(&self, input: &Path, output: &Path) -> Result<()> {
        let input = std::fs::File::open(input)?;
        let mut decoder = zstd::stream::Decoder::new(input)?;
        let mut out = std::fs::File::create(output)?;
        std::io::copy(&mut decoder, &mut out)?;
        Ok(())
    }
}

/// External `zstd -d` subprocess, for builds without the in-process decoder.
#[cfg(not(feature = "zstd"))]
pub struct CliZstd {
    program: PathBuf,
}

#[cfg(not(feature = "zstd"))]
impl CliZstd {
    /// Probe `PATH` for a `zstd` binary.
    pub fn locate() -> Result<Self> {
        let program = which::which("zstd").map_err(|_| CodecError::Unavailable)?;
        Ok(Self { program })
    }
}

#[cfg(not(feature = "zstd"))]
impl Decompressor for CliZstd {
    fn decompress(&self, input: &Path, output: &Path) -> Result<()> {
        let result = std::process::Command::new(&self.program)
            .args(["-d", "-f"])
            .arg(input)
            .arg("-o")
            .arg(output)
            .output()?;
        if result.status.success() {
            Ok(())
        } else {
            Err(CodecError::Tool {
                status: result.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            })
        }
    }
}

/// Select the decompressor for this process.
///
/// The in-process decoder wins whenever it is compiled in; otherwise the
/// external binary is probed, and its absence is a startup error rather than
/// a per-record one.
pub fn detect() -> Result<Arc<dyn Decompressor>> {
    #[cfg(feature = "zstd")]
    {
        tracing::debug!("using in-process zstd decoder");
        Ok(Arc::new(LibZstd))
    }
    #[cfg(not(feature = "zstd"))]
    {
        let cli = CliZstd::locate()?;
        tracing::debug!(program = %cli.program.display(), "using external zstd binary");
        Ok(Arc::new(cli))
    }
}
