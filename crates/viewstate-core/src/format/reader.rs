use super::error::ViewstateError;
use super::layout;

/// Forward-only cursor over an encoded body.
///
/// `position() + remaining()` always equals the length of the slice the
/// reader was created with; every read either consumes exactly the bytes it
/// returns or fails without advancing.
#[derive(Debug, Clone)]
pub struct ViewstateReader<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> ViewstateReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.offset
    }

    /// Bytes not consumed yet.
    pub fn rest(&self) -> &'a [u8] {
        &self.payload[self.offset..]
    }

    pub fn require_remaining(&self, needed: usize) -> Result<(), ViewstateError> {
        if self.remaining() < needed {
            return Err(ViewstateError::InputTooShort {
                needed,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, ViewstateError> {
        let byte = self
            .payload
            .get(self.offset)
            .copied()
            .ok_or(self.truncated(1))?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_slice(&mut self, len: u64) -> Result<&'a [u8], ViewstateError> {
        let len = usize::try_from(len).map_err(|_| self.truncated(len))?;
        let end = self
            .offset
            .checked_add(len)
            .ok_or(self.truncated(len as u64))?;
        let bytes = self
            .payload
            .get(self.offset..end)
            .ok_or(self.truncated(len as u64))?;
        self.offset = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ViewstateError> {
        let bytes = self.read_slice(N as u64)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Decode a 7-bit varint.
    ///
    /// Reading stops once the shift reaches 32 even when the last byte still
    /// has its continuation bit set, so at most five bytes are consumed.
    pub fn read_varint(&mut self) -> Result<u64, ViewstateError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        while shift < layout::VARINT_SHIFT_LIMIT {
            let byte = self.read_u8()?;
            value |= u64::from(byte & layout::VARINT_PAYLOAD_MASK) << shift;
            if byte & layout::VARINT_CONTINUATION_BIT == 0 {
                break;
            }
            shift += layout::VARINT_SHIFT_STEP;
        }
        Ok(value)
    }

    /// Read a varint length followed by that many bytes.
    pub fn read_length_prefixed(&mut self) -> Result<&'a [u8], ViewstateError> {
        let len = self.read_varint()?;
        self.read_slice(len)
    }

    fn truncated(&self, needed: u64) -> ViewstateError {
        ViewstateError::Truncated {
            offset: self.offset,
            needed,
            actual: self.remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewstateReader;
    use crate::format::error::ViewstateError;

    fn varint(bytes: &[u8]) -> (u64, usize) {
        let mut reader = ViewstateReader::new(bytes);
        let value = reader.read_varint().unwrap();
        (value, reader.position())
    }

    #[test]
    fn varint_single_byte_values() {
        assert_eq!(varint(&[0x00]), (0, 1));
        assert_eq!(varint(&[0x7f]), (127, 1));
    }

    #[test]
    fn varint_two_bytes() {
        assert_eq!(varint(&[0x80, 0x01]), (128, 2));
        assert_eq!(varint(&[0xac, 0x02, 0xff]), (300, 2));
    }

    #[test]
    fn varint_stops_after_five_bytes() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut reader = ViewstateReader::new(&bytes);
        let value = reader.read_varint().unwrap();
        assert_eq!(reader.position(), 5);
        assert_eq!(reader.remaining(), 2);
        assert_eq!(value, (1u64 << 35) - 1);
    }

    #[test]
    fn varint_truncated_mid_sequence() {
        let mut reader = ViewstateReader::new(&[0x80, 0x80]);
        let err = reader.read_varint().unwrap_err();
        assert!(matches!(
            err,
            ViewstateError::Truncated {
                offset: 2,
                needed: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn read_slice_does_not_advance_on_failure() {
        let mut reader = ViewstateReader::new(&[1, 2, 3]);
        assert!(reader.read_slice(4).is_err());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_slice(2).unwrap(), &[1, 2]);
        assert_eq!(reader.rest(), &[3]);
    }

    #[test]
    fn read_slice_rejects_huge_lengths() {
        let mut reader = ViewstateReader::new(&[0u8; 4]);
        let err = reader.read_slice(u64::MAX).unwrap_err();
        assert!(matches!(err, ViewstateError::Truncated { .. }));
    }

    #[test]
    fn length_prefixed_reads_exact_bytes() {
        let mut reader = ViewstateReader::new(&[0x03, b'a', b'b', b'c', b'd']);
        assert_eq!(reader.read_length_prefixed().unwrap(), b"abc");
        assert_eq!(reader.position() + reader.remaining(), 5);
    }

    #[test]
    fn require_remaining_reports_input_too_short() {
        let reader = ViewstateReader::new(&[0x01]);
        let err = reader.require_remaining(2).unwrap_err();
        assert!(matches!(
            err,
            ViewstateError::InputTooShort {
                needed: 2,
                actual: 1
            }
        ));
    }
}
