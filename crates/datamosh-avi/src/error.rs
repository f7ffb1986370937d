//! Error types for datamosh-avi.

use crate::riff::FourCc;
use std::io;
use thiserror::Error;

/// Result type for datamosh-avi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for datamosh-avi operations.
///
/// Every variant except [`Error::Io`] is raised while parsing or rewriting an
/// in-memory buffer, before any output byte reaches the filesystem.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading the source or writing the destination.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required structural chunk does not occur at or after `from`.
    #[error("chunk '{tag}' not found at or after offset {from}")]
    ChunkNotFound { tag: FourCc, from: usize },

    /// A header sub-chunk is missing, misplaced, or too short.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The frame walk ran out of buffer (or into the index) early.
    #[error("truncated frame stream: expected {expected} frames, found {found} (stopped at offset {offset})")]
    TruncatedStream {
        expected: u32,
        found: u32,
        offset: usize,
    },

    /// A sync frame had to be replaced before any delta frame was seen.
    #[error("no delta frame available to replace sync frame {frame}")]
    NoReferenceFrame { frame: u32 },

    /// The rewritten frame count does not fit the 32-bit header field.
    #[error("rewritten frame count {0} does not fit in the main header")]
    FrameCountOverflow(i64),
}

impl Error {
    /// Create a malformed header error.
    pub fn malformed_header(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }
}
