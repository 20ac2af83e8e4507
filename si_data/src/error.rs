use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions for the SI loaders and the shift corrector. None of these
/// are recoverable and none leave partial results behind.
#[derive(Debug, Error)]
pub enum SiError {
    #[error("spectroscopy grid must be square, got {rows} rows x {cols} cols")]
    Configuration { rows: usize, cols: usize },

    #[error("bad SI file {path:?}: expected {expected} bytes from offset {offset}: {source}")]
    Format {
        path: PathBuf,
        expected: usize,
        offset: u64,
        source: std::io::Error,
    },

    #[error("rotation correction is not implemented (requested angle {angle} rad)")]
    UnsupportedRotation { angle: f32 },
}
