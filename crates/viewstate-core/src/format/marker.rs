use super::layout;

/// Decoder selected by a marker byte.
///
/// Several marker bytes share one decoder (for instance four distinct string
/// markers); the mapping is total over the recognized set and anything else
/// yields `None` from [`Marker::from_byte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Null,
    EmptyString,
    Zero,
    True,
    False,
    Integer,
    String,
    Enum,
    Color,
    Pair,
    Triplet,
    Time,
    Unit,
    Rgba,
    StringSlice,
    Slice,
    StringRef,
    FormattedString,
    SparseArray,
    Map,
    TypedSlice,
    Binary,
}

impl Marker {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let marker = match byte {
            layout::MARKER_NULL | layout::MARKER_NULL_ALT => Marker::Null,
            layout::MARKER_EMPTY_STRING => Marker::EmptyString,
            layout::MARKER_ZERO => Marker::Zero,
            layout::MARKER_TRUE => Marker::True,
            layout::MARKER_FALSE => Marker::False,
            layout::MARKER_INTEGER | layout::MARKER_INTEGER_ALT => Marker::Integer,
            layout::MARKER_STRING
            | layout::MARKER_STRING_ALT
            | layout::MARKER_STRING_TYPED
            | layout::MARKER_STRING_FORMATTED => Marker::String,
            layout::MARKER_ENUM => Marker::Enum,
            layout::MARKER_COLOR => Marker::Color,
            layout::MARKER_PAIR => Marker::Pair,
            layout::MARKER_TRIPLET => Marker::Triplet,
            layout::MARKER_TIME => Marker::Time,
            layout::MARKER_UNIT => Marker::Unit,
            layout::MARKER_RGBA => Marker::Rgba,
            layout::MARKER_STRING_SLICE => Marker::StringSlice,
            layout::MARKER_SLICE => Marker::Slice,
            layout::MARKER_STRING_REF => Marker::StringRef,
            layout::MARKER_FORMATTED_STRING => Marker::FormattedString,
            layout::MARKER_SPARSE_ARRAY => Marker::SparseArray,
            layout::MARKER_MAP => Marker::Map,
            layout::MARKER_TYPED_SLICE => Marker::TypedSlice,
            layout::MARKER_BINARY => Marker::Binary,
            _ => return None,
        };
        Some(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::Marker;

    #[test]
    fn aliases_share_a_decoder() {
        assert_eq!(Marker::from_byte(0x01), Some(Marker::Null));
        assert_eq!(Marker::from_byte(0x64), Some(Marker::Null));
        assert_eq!(Marker::from_byte(0x02), Some(Marker::Integer));
        assert_eq!(Marker::from_byte(0x2b), Some(Marker::Integer));
        for byte in [0x05, 0x1e, 0x2a, 0x29] {
            assert_eq!(Marker::from_byte(byte), Some(Marker::String));
        }
    }

    #[test]
    fn unrecognized_bytes_have_no_marker() {
        for byte in [0x00, 0x03, 0x99, 0xff] {
            assert_eq!(Marker::from_byte(byte), None);
        }
    }

    #[test]
    fn recognized_set_is_exactly_twenty_seven_bytes() {
        let count = (0..=u8::MAX)
            .filter(|byte| Marker::from_byte(*byte).is_some())
            .count();
        assert_eq!(count, 27);
    }
}
