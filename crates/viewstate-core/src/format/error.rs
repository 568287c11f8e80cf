use thiserror::Error;

/// Errors returned by viewstate decoding.
///
/// Every variant is terminal for the decode in progress: the format has no
/// resynchronization point, so nothing is salvaged after a failure.
///
/// # Examples
/// ```
/// use viewstate_core::ViewstateError;
///
/// let err = ViewstateError::UnknownMarker { marker: 0x99, offset: 0 };
/// assert!(err.to_string().contains("unknown marker"));
/// ```
#[derive(Debug, Error)]
pub enum ViewstateError {
    #[error("invalid base64 input: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("input too short: need {needed} bytes, got {actual}")]
    InputTooShort { needed: usize, actual: usize },
    #[error("bad preamble: expected [ff, 01], got {found:02x?}")]
    BadPreamble { found: [u8; 2] },
    #[error("unknown marker 0x{marker:02x} at offset {offset}")]
    UnknownMarker { marker: u8, offset: usize },
    #[error("truncated input at offset {offset}: need {needed} bytes, got {actual}")]
    Truncated {
        offset: usize,
        needed: u64,
        actual: usize,
    },
    #[error("sparse array index {index} out of range for length {length}")]
    InvalidIndex { index: u64, length: usize },
    #[error("nesting depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },
    #[error("sparse array length {length} exceeds limit of {limit}")]
    SparseArrayTooLarge { length: u64, limit: usize },
}
