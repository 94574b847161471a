//! HTTP Range request parsing module
//!
//! Single byte-range requests (RFC 9110 §14), enough for media seeking and
//! resumed downloads of static files.

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn content_length(&self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(&self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// What to send for a request's `Range` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable Range header: send the whole file
    Full,
    /// Send `206 Partial Content` with this slice
    Partial(ByteRange),
    /// Send `416 Range Not Satisfiable`
    Unsatisfiable,
}

/// Parse a `Range` header against a file of `file_size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Multi-range requests, other units and malformed headers are ignored and
/// the full file is sent.
///
/// # Examples
/// ```
/// use card_vault::http::range::{parse_range_header, ByteRange, RangeOutcome};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeOutcome::Partial(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeOutcome::Full);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeOutcome {
    let Some(range_set) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if range_set.contains(',') || file_size == 0 {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = range_set.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());
    let last_byte = file_size - 1;

    if first.is_empty() {
        // Suffix: the final N bytes
        return match last.parse::<usize>() {
            Ok(0) => RangeOutcome::Unsatisfiable,
            Ok(suffix) => RangeOutcome::Partial(ByteRange {
                start: file_size.saturating_sub(suffix),
                end: last_byte,
            }),
            Err(_) => RangeOutcome::Full,
        };
    }

    let Ok(start) = first.parse::<usize>() else {
        return RangeOutcome::Full;
    };
    let end = if last.is_empty() {
        last_byte
    } else {
        match last.parse::<usize>() {
            Ok(end) => end.min(last_byte),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if start > last_byte || start > end {
        RangeOutcome::Unsatisfiable
    } else {
        RangeOutcome::Partial(ByteRange { start, end })
    }
}
