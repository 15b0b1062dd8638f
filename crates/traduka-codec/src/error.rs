use std::io;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(
        "no zstd decompressor available (enable the `zstd` feature or install the zstd binary)"
    )]
    Unavailable,

    #[error("zstd exited with status {status}: {stderr}")]
    Tool { status: i32, stderr: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
