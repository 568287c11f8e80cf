//! Viewstate core library for offline payload analysis.
//!
//! This crate decodes captured, base64-encoded viewstate blobs into an
//! inspectable value tree: the container strips base64 and validates the
//! preamble, the marker-dispatch decoder (layout/reader/parser) walks the
//! body, and the leftover bytes are labelled as a signature by length.
//! Decoding is byte-oriented and side-effect free; how the text is obtained
//! and where reports go is left to callers such as the CLI.
//!
//! Invariants:
//! - Every byte of the body is consumed by exactly one decoder or returned
//!   as signature bytes.
//! - Length, count and index fields are checked before use; violations are
//!   errors, never default values.
//! - Signatures are classified, never verified.
//!
//! Version française (résumé):
//! Cette crate décode hors ligne les charges viewstate capturées : base64 ->
//! préambule -> décodeur par marqueurs (layout/reader/parser) -> arbre de
//! valeurs + octets de signature classés par longueur (jamais vérifiés).
//!
//! # Examples
//! ```
//! use viewstate_core::{SignatureAlgorithm, Viewstate};
//!
//! let mut viewstate = Viewstate::new("/wECBQ==")?;
//! let value = viewstate.decode()?;
//! assert_eq!(value.to_string(), "5");
//! assert_eq!(viewstate.mac(), SignatureAlgorithm::Unknown);
//! # Ok::<(), viewstate_core::ViewstateError>(())
//! ```

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

mod container;
mod format;
mod options;
mod value;

pub use container::{DecodedPayload, Signature, SignatureAlgorithm, Viewstate, decode_payload};
pub use format::marker::Marker;
pub use format::reader::ViewstateReader;
pub use format::{ValueParser, ViewstateError, parse, parse_with_options};
pub use options::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_SPARSE_LENGTH, DecodeOptions};
pub use value::{DecodedValue, Mapping, MappingEntry, Text, Unresolved};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the caller does not stamp the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Analysis report for one decoded payload.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    /// Input metadata.
    pub input: InputInfo,
    /// Trailing signature classification.
    pub signature: SignatureSummary,
    /// Decoded value tree.
    pub value: DecodedValue,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
///
/// # Examples
/// ```
/// use viewstate_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.txt".to_string(),
///     bytes: 42,
/// };
/// assert_eq!(input.bytes, 42);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided by the caller (`-` for stdin or inline text).
    pub path: String,
    /// Decoded payload size in bytes.
    pub bytes: u64,
}

/// Signature classification as reported.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureSummary {
    pub algorithm: SignatureAlgorithm,
    /// Number of trailing bytes.
    pub length: usize,
    /// Trailing bytes in lowercase hex (omitted when empty).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hex: String,
}

impl From<&Signature> for SignatureSummary {
    fn from(signature: &Signature) -> Self {
        Self {
            algorithm: signature.algorithm,
            length: signature.bytes.len(),
            hex: value::hex(&signature.bytes),
        }
    }
}

/// Decode `viewstate` (if not decoded yet) and build its report.
///
/// # Examples
/// ```
/// use viewstate_core::{Viewstate, build_report};
///
/// let mut viewstate = Viewstate::new("/wECBQ==")?;
/// let report = build_report("inline", &mut viewstate)?;
/// assert_eq!(report.report_version, viewstate_core::REPORT_VERSION);
/// assert_eq!(report.input.bytes, 4);
/// assert_eq!(report.signature.length, 0);
/// # Ok::<(), viewstate_core::ViewstateError>(())
/// ```
pub fn build_report(
    input_path: &str,
    viewstate: &mut Viewstate,
) -> Result<DecodeReport, ViewstateError> {
    let value = viewstate.decode()?.clone();
    let signature = Signature {
        algorithm: viewstate.mac(),
        bytes: viewstate.signature().to_vec(),
    };
    Ok(DecodeReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "viewstate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: viewstate.raw().len() as u64,
        },
        signature: SignatureSummary::from(&signature),
        value,
    })
}

/// Decode base64 `text` with `options` and build its report.
pub fn analyze_text(
    input_path: &str,
    text: &str,
    options: DecodeOptions,
) -> Result<DecodeReport, ViewstateError> {
    let mut viewstate = Viewstate::new(text)?.with_options(options);
    build_report(input_path, &mut viewstate)
}

/// Format a timestamp for `generated_at`, falling back to the default.
pub fn format_generated_at(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}
