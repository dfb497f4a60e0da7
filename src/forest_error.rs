//! ForestMeshError: unified error type for forest-mesh public APIs.
//!
//! All fallible public operations return this error; invariant violations
//! detected after construction are programmer bugs and are handled by
//! debug assertions instead.

use thiserror::Error;

/// Unified error type for forest-mesh operations.
#[derive(Debug, Error)]
pub enum ForestMeshError {
    /// A connectivity failed structural validation on construction or load.
    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(&'static str),
    /// A connectivity file has a bad magic string, an unsupported format
    /// version, or a truncated payload.
    #[error("corrupt connectivity file: {0}")]
    CorruptFile(String),
    /// A geometry produced a non-positive Jacobian determinant.
    #[error("degenerate geometry in tree {tree}: det J = {det}")]
    GeometryDegenerate { tree: i32, det: f64 },
    /// An input index is outside its documented range.
    #[error("{what} index {got} out of range 0..{bound}")]
    OutOfRange {
        what: &'static str,
        got: i64,
        bound: i64,
    },
    /// An integer is not a valid connect-type encoding.
    #[error("unknown connect type value {0}")]
    UnknownConnectType(i32),
    /// Underlying I/O failure while saving or loading a connectivity.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
