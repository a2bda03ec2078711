//! Byte-range streaming of encoded media files.
//!
//! Resolves a client's optional range request against the file on disk and
//! produces a response descriptor whose body is read incrementally. Each
//! request opens its own bounded reader, so concurrent seeks over the same
//! file share no state.

pub mod file_stream;
pub mod range;

use std::path::PathBuf;

pub use file_stream::{StreamContent, stream_file};
pub use range::{ByteRange, ResolvedRange, resolve_range};

/// Errors that can occur while preparing a streaming response.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The record exists but its file does not (not yet encoded, or removed
    /// out of band). Distinct from a record lookup miss.
    #[error("Media file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Range starting at byte {start} not satisfiable for {total_size}-byte file")]
    RangeNotSatisfiable { start: u64, total_size: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
