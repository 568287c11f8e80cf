pub const PREAMBLE: [u8; 2] = [0xff, 0x01];

/// Bytes that must remain before a marker may be read.
pub const MIN_VALUE_LEN: usize = 2;

pub const VARINT_PAYLOAD_MASK: u8 = 0x7f;
pub const VARINT_CONTINUATION_BIT: u8 = 0x80;
pub const VARINT_SHIFT_STEP: u32 = 7;
pub const VARINT_SHIFT_LIMIT: u32 = 32;

pub const COLOR_INDEX_LEN: usize = 1;
pub const RGBA_LEN: usize = 4;
pub const TIME_LEN: usize = 8;
pub const UNIT_LEN: usize = 12;

pub const HMAC_SHA1_LEN: usize = 20;
pub const HMAC_SHA256_LEN: usize = 32;

pub const MARKER_NULL: u8 = 0x01;
pub const MARKER_INTEGER: u8 = 0x02;
pub const MARKER_STRING: u8 = 0x05;
pub const MARKER_TIME: u8 = 0x06;
pub const MARKER_RGBA: u8 = 0x09;
pub const MARKER_COLOR: u8 = 0x0a;
pub const MARKER_ENUM: u8 = 0x0b;
pub const MARKER_PAIR: u8 = 0x0f;
pub const MARKER_TRIPLET: u8 = 0x10;
pub const MARKER_TYPED_SLICE: u8 = 0x14;
pub const MARKER_STRING_SLICE: u8 = 0x15;
pub const MARKER_SLICE: u8 = 0x16;
pub const MARKER_MAP: u8 = 0x18;
pub const MARKER_UNIT: u8 = 0x1b;
pub const MARKER_STRING_ALT: u8 = 0x1e;
pub const MARKER_STRING_REF: u8 = 0x1f;
pub const MARKER_FORMATTED_STRING: u8 = 0x28;
pub const MARKER_STRING_FORMATTED: u8 = 0x29;
pub const MARKER_STRING_TYPED: u8 = 0x2a;
pub const MARKER_INTEGER_ALT: u8 = 0x2b;
pub const MARKER_BINARY: u8 = 0x32;
pub const MARKER_SPARSE_ARRAY: u8 = 0x3c;
pub const MARKER_NULL_ALT: u8 = 0x64;
pub const MARKER_EMPTY_STRING: u8 = 0x65;
pub const MARKER_ZERO: u8 = 0x66;
pub const MARKER_TRUE: u8 = 0x67;
pub const MARKER_FALSE: u8 = 0x68;
