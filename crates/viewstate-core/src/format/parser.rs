use super::error::ViewstateError;
use super::layout;
use super::marker::Marker;
use super::reader::ViewstateReader;
use crate::options::DecodeOptions;
use crate::value::{DecodedValue, Text, Unresolved};

/// Decode one value from the start of `body`.
///
/// Returns the value and the bytes that follow it.
///
/// # Examples
/// ```
/// use viewstate_core::{DecodedValue, parse};
///
/// let (value, rest) = parse(&[0x1e, 0x05, b'h', b'e', b'l', b'l', b'o'])?;
/// assert_eq!(value.to_string(), "hello");
/// assert!(rest.is_empty());
///
/// let (value, rest) = parse(&[0x67, 0xaa])?;
/// assert_eq!(value, DecodedValue::Boolean(true));
/// assert_eq!(rest, &[0xaa]);
/// # Ok::<(), viewstate_core::ViewstateError>(())
/// ```
pub fn parse(body: &[u8]) -> Result<(DecodedValue, &[u8]), ViewstateError> {
    parse_with_options(body, &DecodeOptions::default())
}

/// Same as [`parse`], with explicit resource limits.
pub fn parse_with_options<'a>(
    body: &'a [u8],
    options: &DecodeOptions,
) -> Result<(DecodedValue, &'a [u8]), ViewstateError> {
    let mut parser = ValueParser::new(body, *options);
    let value = parser.parse_value()?;
    Ok((value, parser.rest()))
}

/// Recursive marker-dispatch decoder over a single body.
///
/// Composite decoders (see `composite`) call back into
/// [`ValueParser::parse_value`] for every nested value.
pub struct ValueParser<'a> {
    pub(super) reader: ViewstateReader<'a>,
    pub(super) options: DecodeOptions,
    /// Sparse array slots still available to this decode.
    pub(super) sparse_budget: usize,
    depth: usize,
}

impl<'a> ValueParser<'a> {
    pub fn new(body: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            reader: ViewstateReader::new(body),
            options,
            sparse_budget: options.max_sparse_length,
            depth: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn rest(&self) -> &'a [u8] {
        self.reader.rest()
    }

    pub fn parse_value(&mut self) -> Result<DecodedValue, ViewstateError> {
        if self.depth >= self.options.max_depth {
            return Err(ViewstateError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let value = self.dispatch();
        self.depth -= 1;
        value
    }

    fn dispatch(&mut self) -> Result<DecodedValue, ViewstateError> {
        self.reader.require_remaining(layout::MIN_VALUE_LEN)?;
        let offset = self.reader.position();
        let byte = self.reader.read_u8()?;
        let marker = Marker::from_byte(byte).ok_or(ViewstateError::UnknownMarker {
            marker: byte,
            offset,
        })?;

        match marker {
            Marker::Null => Ok(DecodedValue::Absent),
            Marker::EmptyString => Ok(DecodedValue::Text(Text::default())),
            Marker::Zero => Ok(DecodedValue::Integer(0)),
            Marker::True => Ok(DecodedValue::Boolean(true)),
            Marker::False => Ok(DecodedValue::Boolean(false)),
            Marker::Integer => self.parse_integer(),
            Marker::String => self.parse_text().map(DecodedValue::Text),
            Marker::Enum => self.parse_enum(),
            Marker::Color => self.parse_color(),
            Marker::Pair => self.parse_pair(),
            Marker::Triplet => self.parse_triplet(),
            Marker::Time => self.parse_time(),
            Marker::Unit => self.parse_unit(),
            Marker::Rgba => self.parse_rgba(),
            Marker::StringSlice => self.parse_text_sequence(),
            Marker::Slice => self.parse_sequence(),
            Marker::StringRef => self.parse_reference(),
            Marker::FormattedString => self.parse_formatted_text(),
            Marker::SparseArray => self.parse_sparse_array(),
            Marker::Map => self.parse_mapping(),
            Marker::TypedSlice => self.parse_typed_sequence(),
            Marker::Binary => self.parse_binary(),
        }
    }

    fn parse_integer(&mut self) -> Result<DecodedValue, ViewstateError> {
        self.reader.read_varint().map(DecodedValue::Integer)
    }

    pub(super) fn parse_text(&mut self) -> Result<Text, ViewstateError> {
        let bytes = self.reader.read_length_prefixed()?;
        Ok(Text::new(bytes.to_vec()))
    }

    fn parse_binary(&mut self) -> Result<DecodedValue, ViewstateError> {
        let bytes = self.reader.read_length_prefixed()?;
        Ok(DecodedValue::BinaryBlob(bytes.to_vec()))
    }

    // Raw palette index; no lookup table is applied.
    fn parse_color(&mut self) -> Result<DecodedValue, ViewstateError> {
        let [index] = self.reader.read_array::<{ layout::COLOR_INDEX_LEN }>()?;
        Ok(DecodedValue::ColorIndex(index))
    }

    fn parse_rgba(&mut self) -> Result<DecodedValue, ViewstateError> {
        let [r, g, b, a] = self.reader.read_array::<{ layout::RGBA_LEN }>()?;
        Ok(DecodedValue::RgbaColor { r, g, b, a })
    }

    fn parse_time(&mut self) -> Result<DecodedValue, ViewstateError> {
        let raw = self.reader.read_slice(layout::TIME_LEN as u64)?;
        Ok(DecodedValue::TimeStub(Unresolved::new(raw.to_vec())))
    }

    fn parse_unit(&mut self) -> Result<DecodedValue, ViewstateError> {
        let raw = self.reader.read_slice(layout::UNIT_LEN as u64)?;
        Ok(DecodedValue::UnitStub(Unresolved::new(raw.to_vec())))
    }

    // Index into a string table that is not part of the payload.
    fn parse_reference(&mut self) -> Result<DecodedValue, ViewstateError> {
        self.reader.read_varint().map(DecodedValue::Reference)
    }
}
