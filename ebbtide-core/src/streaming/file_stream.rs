//! Incremental file streaming over a resolved byte range.

use std::io::{ErrorKind, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncReadExt, Take};
use tokio_util::io::ReaderStream;

use super::range::{ResolvedRange, resolve_range};
use super::StreamError;

/// Fallback when the filename suggests no specific video container.
const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Response descriptor for one streaming request.
///
/// The body is a bounded reader over exactly the served byte span; nothing
/// is buffered up front, so large files and many concurrent seeks stay
/// cheap.
pub struct StreamContent {
    /// True when a sub-range is being served (partial content)
    pub partial: bool,
    /// First byte offset served
    pub start: u64,
    /// Last byte offset served (inclusive)
    pub end: u64,
    /// Exact number of body bytes
    pub length: u64,
    /// Size of the whole file
    pub total_size: u64,
    /// Video MIME type for the response
    pub content_type: &'static str,
    /// Incremental body reader
    pub body: ReaderStream<Take<File>>,
}

impl StreamContent {
    /// `Content-Range` value for a partial response.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Opens the media file for `filename` under `dir` and prepares a full or
/// partial response for the optional Range header.
///
/// # Errors
/// - `StreamError::FileNotFound` - File is not on disk (the record may
///   still exist; the job has not finished, or the file was removed
///   externally)
/// - `StreamError::RangeNotSatisfiable` - Range start at or past the end
/// - `StreamError::Io` - Metadata query, open, or seek failed
pub async fn stream_file(
    dir: &Path,
    filename: &str,
    range_header: Option<&str>,
) -> Result<StreamContent, StreamError> {
    let path = dir.join(filename);

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StreamError::FileNotFound { path });
        }
        Err(e) => return Err(StreamError::Io(e)),
    };
    let total_size = metadata.len();

    let resolved = resolve_range(range_header, total_size)?;
    let (partial, start, end) = match resolved {
        ResolvedRange::Full => (false, 0, total_size.saturating_sub(1)),
        ResolvedRange::Partial(range) => (true, range.start, range.end),
    };
    let length = if total_size == 0 { 0 } else { end - start + 1 };

    let mut file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StreamError::FileNotFound { path });
        }
        Err(e) => return Err(StreamError::Io(e)),
    };
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    Ok(StreamContent {
        partial,
        start,
        end,
        length,
        total_size,
        content_type: content_type_for(filename),
        body: ReaderStream::new(file.take(length)),
    })
}

/// Picks a video MIME type for the filename.
///
/// Non-video guesses fall back to the default rather than leaking, say,
/// text/plain for an oddly named file.
fn content_type_for(filename: &str) -> &'static str {
    mime_guess::from_path(filename)
        .first_raw()
        .filter(|mime| mime.starts_with("video/"))
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
