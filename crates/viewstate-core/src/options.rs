use serde::{Deserialize, Serialize};

/// Default nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 512;
/// Default limit on sparse array slots allocated by one decode.
pub const DEFAULT_MAX_SPARSE_LENGTH: usize = 1 << 20;

/// Resource limits applied while decoding.
///
/// Nesting depth is already bounded by the input length, but a long run of
/// nested markers would still exhaust the stack; sparse arrays declare a
/// logical length independent of the bytes that follow, so their combined
/// length is capped for the whole decode rather than per array.
///
/// # Examples
/// ```
/// use viewstate_core::DecodeOptions;
///
/// let options: DecodeOptions = serde_json::from_str(r#"{"max_depth": 16}"#).unwrap();
/// assert_eq!(options.max_depth, 16);
/// assert_eq!(options.max_sparse_length, viewstate_core::DEFAULT_MAX_SPARSE_LENGTH);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Nesting depth at which decoding fails.
    pub max_depth: usize,
    /// Total sparse array length accepted across one decode.
    pub max_sparse_length: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_sparse_length: DEFAULT_MAX_SPARSE_LENGTH,
        }
    }
}
