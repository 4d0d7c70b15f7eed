//! Error types for the tetrasoft simulation.
//!
//! All crates return `SoftBodyResult<T>` from fallible operations.
//! Errors are local to one body: a failed load never affects other bodies.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the tetrasoft simulation.
#[derive(Debug, Error)]
pub enum SoftBodyError {
    /// The tetra asset is missing or unreadable.
    #[error("Resource not found: {}", path.display())]
    ResourceNotFound {
        /// Resolved path that could not be opened.
        path: PathBuf,
    },

    /// A record tag's parsed count disagrees with its declared header count.
    #[error("Malformed input: expected {expected} '{record}' records, found {actual}")]
    MalformedInput {
        /// Record tag (`v`, `e`, `f`, `t`, `tn`).
        record: &'static str,
        /// Count declared in the header.
        expected: usize,
        /// Count actually parsed.
        actual: usize,
    },

    /// A single line could not be parsed.
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord {
        /// 1-based line number in the source text.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A topology reference points outside its target array.
    #[error("{kind} index {index} is out of range (len: {len})")]
    IndexOutOfRange {
        /// What kind of element was referenced.
        kind: &'static str,
        /// The offending index.
        index: i64,
        /// Length of the referenced array.
        len: usize,
    },

    /// Mesh data is inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Visual mesh vertex count no longer matches the skin mapping.
    #[error("Visual mesh has {actual} vertices but the skin mapping was built for {expected}")]
    MeshMismatch {
        /// Vertex count at precomputation time.
        expected: usize,
        /// Vertex count of the buffer passed in.
        actual: usize,
    },

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, SoftBodyError>`.
pub type SoftBodyResult<T> = Result<T, SoftBodyError>;
