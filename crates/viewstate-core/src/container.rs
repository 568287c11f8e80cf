//! Top-level viewstate container.
//!
//! A [`Viewstate`] owns the base64-decoded payload, validates the preamble,
//! runs the marker-dispatch decoder on the body and labels whatever bytes
//! remain as a signature. Signatures are classified by length only and are
//! never verified.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::format::ViewstateError;
use crate::format::layout;
use crate::format::parser::parse_with_options;
use crate::format::reader::ViewstateReader;
use crate::options::DecodeOptions;
use crate::value::DecodedValue;

/// Length-based guess at the MAC that produced the trailing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SignatureAlgorithm {
    /// No decode has run yet.
    #[default]
    #[serde(rename = "none-detected")]
    NoneDetected,
    #[serde(rename = "hmac_sha1")]
    HmacSha1,
    #[serde(rename = "hmac_sha256")]
    HmacSha256,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SignatureAlgorithm {
    /// Classify trailing bytes by their length.
    ///
    /// # Examples
    /// ```
    /// use viewstate_core::SignatureAlgorithm;
    ///
    /// assert_eq!(SignatureAlgorithm::classify(20), SignatureAlgorithm::HmacSha1);
    /// assert_eq!(SignatureAlgorithm::classify(32), SignatureAlgorithm::HmacSha256);
    /// assert_eq!(SignatureAlgorithm::classify(0), SignatureAlgorithm::Unknown);
    /// ```
    pub fn classify(len: usize) -> Self {
        match len {
            layout::HMAC_SHA1_LEN => SignatureAlgorithm::HmacSha1,
            layout::HMAC_SHA256_LEN => SignatureAlgorithm::HmacSha256,
            _ => SignatureAlgorithm::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::NoneDetected => "none-detected",
            SignatureAlgorithm::HmacSha1 => "hmac_sha1",
            SignatureAlgorithm::HmacSha256 => "hmac_sha256",
            SignatureAlgorithm::Unknown => "unknown",
        }
    }

    /// Whether the length matches a known HMAC output size.
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            SignatureAlgorithm::HmacSha1 | SignatureAlgorithm::HmacSha256
        )
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing bytes left after the value tree, with their classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub algorithm: SignatureAlgorithm,
    pub bytes: Vec<u8>,
}

impl Signature {
    pub fn from_trailing(bytes: &[u8]) -> Self {
        Self {
            algorithm: SignatureAlgorithm::classify(bytes.len()),
            bytes: bytes.to_vec(),
        }
    }
}

/// Result of decoding one raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub value: DecodedValue,
    pub signature: Signature,
}

/// Decode a raw (already base64-decoded) payload.
///
/// Returns a freshly allocated result on every call, so the same bytes can
/// be decoded from several threads without sharing a container.
///
/// # Errors
/// `InputTooShort` below two bytes, `BadPreamble` when the payload does not
/// start with `ff 01`, or any error raised while decoding the body.
pub fn decode_payload(
    raw: &[u8],
    options: &DecodeOptions,
) -> Result<DecodedPayload, ViewstateError> {
    let mut reader = ViewstateReader::new(raw);
    reader.require_remaining(layout::PREAMBLE.len())?;
    let preamble = reader.read_array::<2>()?;
    if preamble != layout::PREAMBLE {
        return Err(ViewstateError::BadPreamble { found: preamble });
    }

    let (value, trailing) = parse_with_options(reader.rest(), options)?;
    Ok(DecodedPayload {
        value,
        signature: Signature::from_trailing(trailing),
    })
}

/// Captured viewstate payload and its decode result.
///
/// # Examples
/// ```
/// use viewstate_core::{DecodedValue, SignatureAlgorithm, Viewstate};
///
/// // ff 01 | 02 05 (integer 5), no trailing signature
/// let mut viewstate = Viewstate::new("/wECBQ==")?;
/// assert_eq!(viewstate.mac(), SignatureAlgorithm::NoneDetected);
///
/// let value = viewstate.decode()?;
/// assert_eq!(value, &DecodedValue::Integer(5));
/// assert_eq!(viewstate.mac(), SignatureAlgorithm::Unknown);
/// assert!(viewstate.signature().is_empty());
/// # Ok::<(), viewstate_core::ViewstateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Viewstate {
    raw: Vec<u8>,
    options: DecodeOptions,
    decoded: Option<DecodedValue>,
    signature: Signature,
}

impl Viewstate {
    /// Build a container from base64 text.
    ///
    /// ASCII whitespace (line breaks in captured payloads) is ignored.
    ///
    /// # Errors
    /// Returns `InvalidBase64` before any structural decoding is attempted.
    pub fn new(text: &str) -> Result<Self, ViewstateError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let raw = STANDARD.decode(compact)?;
        Ok(Self::from_bytes(raw))
    }

    /// Build a container from an already-decoded payload.
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        Self {
            raw,
            options: DecodeOptions::default(),
            decoded: None,
            signature: Signature::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode the payload, populating the value and signature fields.
    ///
    /// The first successful call stores the result; later calls return it
    /// without decoding again. A failed call leaves the container untouched.
    pub fn decode(&mut self) -> Result<&DecodedValue, ViewstateError> {
        let value = match self.decoded.take() {
            Some(value) => value,
            None => {
                let payload = decode_payload(&self.raw, &self.options)?;
                self.signature = payload.signature;
                payload.value
            }
        };
        let value: &DecodedValue = self.decoded.insert(value);
        Ok(value)
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decoded value tree, once `decode` has succeeded.
    pub fn value(&self) -> Option<&DecodedValue> {
        self.decoded.as_ref()
    }

    pub fn mac(&self) -> SignatureAlgorithm {
        self.signature.algorithm
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature.bytes
    }
}
