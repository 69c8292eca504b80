use std::fmt;
use std::io::{self, Write};

/// Tagged value kinds stored inside a record.
///
/// Every value written into a record is preceded (in the record's tag list)
/// by a one-byte tag. Scalar kinds use the small fixed tags below and occupy
/// their fixed width in the payload. Text uses the high bit as a
/// discriminator and stores the byte length in the low seven bits, so a text
/// fragment can never exceed [`MAX_TEXT_LEN`] bytes.
pub mod tag {
    pub const I8: u8 = 0x01;
    pub const U8: u8 = 0x02;
    pub const I16: u8 = 0x03;
    pub const U16: u8 = 0x04;
    pub const I32: u8 = 0x05;
    pub const U32: u8 = 0x06;
    pub const F32: u8 = 0x07;
    pub const F64: u8 = 0x08;
    pub const I64: u8 = 0x09;
    pub const U64: u8 = 0x0A;

    /// Discriminator bit for text fragments.
    pub const TEXT: u8 = 0x80;
    /// Mask extracting the text length from a text tag.
    pub const TEXT_LEN_MASK: u8 = 0x7F;
}

/// Longest text fragment a single tag can describe.
pub const MAX_TEXT_LEN: usize = tag::TEXT_LEN_MASK as usize;

/// A single value as stored in (or read back from) a record.
///
/// Text borrows its bytes; it is kept as raw bytes rather than `&str`
/// because truncation at [`MAX_TEXT_LEN`] may split a multi-byte character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogValue<'a> {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(&'a [u8]),
}

impl<'a> LogValue<'a> {
    /// Builds a text value, truncating to [`MAX_TEXT_LEN`] bytes.
    ///
    /// ```
    /// # use elog::LogValue;
    /// let long = "x".repeat(200);
    /// match LogValue::text(&long) {
    ///     LogValue::Text(bytes) => assert_eq!(bytes.len(), 127),
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn text(s: &'a str) -> Self {
        Self::bytes(s.as_bytes())
    }

    /// Builds a text value from raw bytes, truncating to [`MAX_TEXT_LEN`].
    pub fn bytes(b: &'a [u8]) -> Self {
        LogValue::Text(&b[..b.len().min(MAX_TEXT_LEN)])
    }

    /// The tag byte describing this value.
    pub fn tag(&self) -> u8 {
        match self {
            LogValue::I8(_) => tag::I8,
            LogValue::U8(_) => tag::U8,
            LogValue::I16(_) => tag::I16,
            LogValue::U16(_) => tag::U16,
            LogValue::I32(_) => tag::I32,
            LogValue::U32(_) => tag::U32,
            LogValue::I64(_) => tag::I64,
            LogValue::U64(_) => tag::U64,
            LogValue::F32(_) => tag::F32,
            LogValue::F64(_) => tag::F64,
            LogValue::Text(b) => tag::TEXT | (b.len().min(MAX_TEXT_LEN) as u8),
        }
    }

    /// Number of payload bytes this value occupies.
    pub fn encoded_len(&self) -> usize {
        match self {
            LogValue::I8(_) | LogValue::U8(_) => 1,
            LogValue::I16(_) | LogValue::U16(_) => 2,
            LogValue::I32(_) | LogValue::U32(_) | LogValue::F32(_) => 4,
            LogValue::I64(_) | LogValue::U64(_) | LogValue::F64(_) => 8,
            LogValue::Text(b) => b.len().min(MAX_TEXT_LEN),
        }
    }

    /// Writes the payload bytes of this value into the front of `dst`.
    ///
    /// Returns the number of bytes written, or `None` if `dst` is too short.
    /// Nothing is written on `None`.
    pub fn encode(&self, dst: &mut [u8]) -> Option<usize> {
        let len = self.encoded_len();
        let dst = dst.get_mut(..len)?;
        match *self {
            LogValue::I8(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::U8(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::I16(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::U16(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::I32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::U32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::I64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::U64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::F32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::F64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            LogValue::Text(b) => dst.copy_from_slice(&b[..len]),
        }
        Some(len)
    }

    /// Decodes one value described by `tag` from the front of `src`.
    ///
    /// Returns the value and the number of bytes consumed, or `None` for an
    /// unknown tag or a short buffer.
    pub fn decode(tag: u8, src: &'a [u8]) -> Option<(Self, usize)> {
        if tag & tag::TEXT != 0 {
            let len = (tag & tag::TEXT_LEN_MASK) as usize;
            return Some((LogValue::Text(src.get(..len)?), len));
        }
        let value = match tag {
            tag::I8 => LogValue::I8(i8::from_le_bytes(fixed(src)?)),
            tag::U8 => LogValue::U8(u8::from_le_bytes(fixed(src)?)),
            tag::I16 => LogValue::I16(i16::from_le_bytes(fixed(src)?)),
            tag::U16 => LogValue::U16(u16::from_le_bytes(fixed(src)?)),
            tag::I32 => LogValue::I32(i32::from_le_bytes(fixed(src)?)),
            tag::U32 => LogValue::U32(u32::from_le_bytes(fixed(src)?)),
            tag::I64 => LogValue::I64(i64::from_le_bytes(fixed(src)?)),
            tag::U64 => LogValue::U64(u64::from_le_bytes(fixed(src)?)),
            tag::F32 => LogValue::F32(f32::from_le_bytes(fixed(src)?)),
            tag::F64 => LogValue::F64(f64::from_le_bytes(fixed(src)?)),
            _ => return None,
        };
        Some((value, value.encoded_len()))
    }

    /// Writes the human-readable form of the value. Text goes out as raw bytes.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            LogValue::Text(b) => out.write_all(b),
            other => write!(out, "{}", other),
        }
    }
}

fn fixed<const N: usize>(src: &[u8]) -> Option<[u8; N]> {
    src.get(..N)?.try_into().ok()
}

impl fmt::Display for LogValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::I8(v) => write!(f, "{}", v),
            LogValue::U8(v) => write!(f, "{}", v),
            LogValue::I16(v) => write!(f, "{}", v),
            LogValue::U16(v) => write!(f, "{}", v),
            LogValue::I32(v) => write!(f, "{}", v),
            LogValue::U32(v) => write!(f, "{}", v),
            LogValue::I64(v) => write!(f, "{}", v),
            LogValue::U64(v) => write!(f, "{}", v),
            LogValue::F32(v) => write!(f, "{}", v),
            LogValue::F64(v) => write!(f, "{}", v),
            LogValue::Text(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: LogValue<'_>) {
        let mut buf = [0u8; 128];
        let written = value.encode(&mut buf).unwrap();
        assert_eq!(written, value.encoded_len());
        let (decoded, read) = LogValue::decode(value.tag(), &buf[..written]).unwrap();
        assert_eq!(read, written);
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_scalar_round_trip() {
        round_trip(LogValue::I8(i8::MIN));
        round_trip(LogValue::U8(u8::MAX));
        round_trip(LogValue::I16(-12345));
        round_trip(LogValue::U16(54321));
        round_trip(LogValue::I32(i32::MIN));
        round_trip(LogValue::U32(u32::MAX));
        round_trip(LogValue::I64(-9_000_000_000));
        round_trip(LogValue::U64(u64::MAX));
        round_trip(LogValue::F32(3.5));
        round_trip(LogValue::F64(-2.718281828459045));
    }

    #[test]
    fn test_text_round_trip() {
        round_trip(LogValue::text(""));
        round_trip(LogValue::text("Hello, 世界"));
        round_trip(LogValue::bytes(&[0xFFu8; 127]));
    }

    #[test]
    fn test_text_tag_packs_length() {
        let value = LogValue::text("abc");
        assert_eq!(value.tag(), 0x83);
        let long = "y".repeat(200);
        assert_eq!(LogValue::text(&long).tag(), 0xFF);
    }

    #[test]
    fn test_encode_short_buffer_writes_nothing() {
        let mut buf = [0xAAu8; 4];
        assert_eq!(LogValue::U64(1).encode(&mut buf), None);
        assert_eq!(buf, [0xAA; 4]);
    }

    #[test]
    fn test_decode_rejects_unknown_tag_and_short_input() {
        assert!(LogValue::decode(0x00, &[0u8; 8]).is_none());
        assert!(LogValue::decode(0x0B, &[0u8; 8]).is_none());
        assert!(LogValue::decode(tag::I32, &[0u8; 3]).is_none());
        assert!(LogValue::decode(tag::TEXT | 5, b"abc").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(LogValue::I32(-7).to_string(), "-7");
        assert_eq!(LogValue::F64(1.5).to_string(), "1.5");
        assert_eq!(LogValue::text("ok").to_string(), "ok");
    }
}
