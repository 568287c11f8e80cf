//! Decoders for values that contain nested values.
//!
//! Every nested value goes back through `ValueParser::parse_value`, so the
//! depth limit and marker validation apply uniformly. Counts and indexes are
//! checked before use: a count larger than the remaining input fails as
//! `Truncated` on the first missing element, and a sparse array index outside
//! the declared length fails as `InvalidIndex`.

use super::error::ViewstateError;
use super::parser::ValueParser;
use crate::value::{DecodedValue, Mapping};

impl ValueParser<'_> {
    pub(super) fn parse_enum(&mut self) -> Result<DecodedValue, ViewstateError> {
        let inner = self.parse_value()?;
        let ordinal = self.reader.read_varint()?;
        Ok(DecodedValue::EnumValue {
            inner: Box::new(inner),
            ordinal,
        })
    }

    pub(super) fn parse_pair(&mut self) -> Result<DecodedValue, ViewstateError> {
        let first = self.parse_value()?;
        let second = self.parse_value()?;
        Ok(DecodedValue::Pair(Box::new(first), Box::new(second)))
    }

    pub(super) fn parse_triplet(&mut self) -> Result<DecodedValue, ViewstateError> {
        let first = self.parse_value()?;
        let second = self.parse_value()?;
        let third = self.parse_value()?;
        Ok(DecodedValue::Triplet(
            Box::new(first),
            Box::new(second),
            Box::new(third),
        ))
    }

    // Elements carry no marker of their own.
    pub(super) fn parse_text_sequence(&mut self) -> Result<DecodedValue, ViewstateError> {
        let count = self.reader.read_varint()?;
        let mut elements = Vec::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            elements.push(DecodedValue::Text(self.parse_text()?));
        }
        Ok(DecodedValue::Sequence(elements))
    }

    pub(super) fn parse_sequence(&mut self) -> Result<DecodedValue, ViewstateError> {
        let count = self.reader.read_varint()?;
        let elements = self.parse_elements(count)?;
        Ok(DecodedValue::Sequence(elements))
    }

    pub(super) fn parse_typed_sequence(&mut self) -> Result<DecodedValue, ViewstateError> {
        let type_tag = self.parse_value()?;
        let count = self.reader.read_varint()?;
        let elements = self.parse_elements(count)?;
        Ok(DecodedValue::TypedSequence {
            type_tag: Box::new(type_tag),
            elements,
        })
    }

    pub(super) fn parse_sparse_array(&mut self) -> Result<DecodedValue, ViewstateError> {
        let type_tag = self.parse_value()?;
        let declared = self.reader.read_varint()?;
        // The budget is shared by every sparse array in this decode.
        let limit = self.sparse_budget;
        let length = usize::try_from(declared)
            .ok()
            .filter(|length| *length <= limit)
            .ok_or(ViewstateError::SparseArrayTooLarge {
                length: declared,
                limit,
            })?;
        self.sparse_budget -= length;
        let entries = self.reader.read_varint()?;

        let mut elements = vec![DecodedValue::Absent; length];
        for _ in 0..entries {
            let index = self.reader.read_varint()?;
            let slot = usize::try_from(index)
                .ok()
                .filter(|index| *index < length)
                .ok_or(ViewstateError::InvalidIndex { index, length })?;
            elements[slot] = self.parse_value()?;
        }

        Ok(DecodedValue::TypedSequence {
            type_tag: Box::new(type_tag),
            elements,
        })
    }

    /// The entry count is a single raw byte, unlike every other counted
    /// collection in the format.
    pub(super) fn parse_mapping(&mut self) -> Result<DecodedValue, ViewstateError> {
        let count = self.reader.read_u8()?;
        let mut mapping = Mapping::new();
        for _ in 0..count {
            let key = self.parse_value()?;
            let value = self.parse_value()?;
            mapping.insert(key, value);
        }
        Ok(DecodedValue::Mapping(mapping))
    }

    // Pattern is a full value; the argument string is bare length-prefixed text.
    pub(super) fn parse_formatted_text(&mut self) -> Result<DecodedValue, ViewstateError> {
        let pattern = self.parse_value()?;
        let args = self.parse_text()?;
        Ok(DecodedValue::FormattedText {
            pattern: Box::new(pattern),
            args,
        })
    }

    fn parse_elements(&mut self, count: u64) -> Result<Vec<DecodedValue>, ViewstateError> {
        let mut elements = Vec::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            elements.push(self.parse_value()?);
        }
        Ok(elements)
    }

    // Each element consumes at least one byte.
    fn capacity_hint(&self, count: u64) -> usize {
        usize::try_from(count)
            .unwrap_or(usize::MAX)
            .min(self.reader.remaining())
    }
}
