//! HTTP Range header resolution.
//!
//! Handles the standard `bytes=start-end` form. A missing end streams to
//! the end of the file; an end past the file is clamped; a start at or past
//! the file is unsatisfiable. Malformed headers are ignored and the full
//! file is served, per RFC 7233's leeway for invalid range specs.

use super::StreamError;

/// Inclusive byte offsets into a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// What a request's Range header resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRange {
    /// Serve the whole file
    Full,
    /// Serve exactly this sub-range
    Partial(ByteRange),
}

/// Resolves an optional Range header against the file size.
///
/// # Errors
/// - `StreamError::RangeNotSatisfiable` - `start` is at or past the end of
///   the file, or past the requested `end`
pub fn resolve_range(header: Option<&str>, total_size: u64) -> Result<ResolvedRange, StreamError> {
    let Some(header) = header else {
        return Ok(ResolvedRange::Full);
    };

    let Some(spec) = header.strip_prefix("bytes=") else {
        return Ok(ResolvedRange::Full);
    };

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return Ok(ResolvedRange::Full);
    };

    let Ok(start) = start_str.parse::<u64>() else {
        return Ok(ResolvedRange::Full);
    };

    if start >= total_size {
        return Err(StreamError::RangeNotSatisfiable { start, total_size });
    }

    let end = end_str
        .parse::<u64>()
        .unwrap_or_else(|_| total_size.saturating_sub(1))
        .min(total_size.saturating_sub(1));

    if end < start {
        return Err(StreamError::RangeNotSatisfiable { start, total_size });
    }

    Ok(ResolvedRange::Partial(ByteRange { start, end }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header_serves_full_file() {
        assert_eq!(resolve_range(None, 1000).unwrap(), ResolvedRange::Full);
    }

    #[test]
    fn test_bounded_range() {
        let resolved = resolve_range(Some("bytes=100-199"), 1000).unwrap();
        assert_eq!(
            resolved,
            ResolvedRange::Partial(ByteRange {
                start: 100,
                end: 199
            })
        );
    }

    #[test]
    fn test_open_ended_range_defaults_to_last_byte() {
        let resolved = resolve_range(Some("bytes=500-"), 1000).unwrap();
        assert_eq!(
            resolved,
            ResolvedRange::Partial(ByteRange {
                start: 500,
                end: 999
            })
        );
    }

    #[test]
    fn test_end_past_file_is_clamped() {
        let resolved = resolve_range(Some("bytes=100-5000"), 1000).unwrap();
        assert_eq!(
            resolved,
            ResolvedRange::Partial(ByteRange {
                start: 100,
                end: 999
            })
        );
    }

    #[test]
    fn test_start_past_file_is_unsatisfiable() {
        let result = resolve_range(Some("bytes=1000-"), 1000);
        assert!(matches!(
            result,
            Err(StreamError::RangeNotSatisfiable {
                start: 1000,
                total_size: 1000
            })
        ));
    }

    #[test]
    fn test_inverted_range_is_unsatisfiable() {
        let result = resolve_range(Some("bytes=500-200"), 1000);
        assert!(matches!(result, Err(StreamError::RangeNotSatisfiable { .. })));
    }

    #[test]
    fn test_malformed_header_is_ignored() {
        assert_eq!(
            resolve_range(Some("items=0-10"), 1000).unwrap(),
            ResolvedRange::Full
        );
        assert_eq!(
            resolve_range(Some("bytes=abc-10"), 1000).unwrap(),
            ResolvedRange::Full
        );
    }

    #[test]
    fn test_range_length_is_inclusive() {
        let range = ByteRange { start: 0, end: 99 };
        assert_eq!(range.length(), 100);
    }
}
