//! Primitive little-endian I/O layer
//!
//! Extension traits over [`std::io::Read`] and [`std::io::Write`] providing
//! the fixed-width primitives the ANM grammar is built from, plus the two
//! format-specific ones: booleans stored as a single byte and "tagged
//! strings" (u16 byte-length prefix followed by raw UTF-8).
//!
//! Truncation mid-field surfaces as [`AnmError::UnexpectedEof`]; every
//! length-prefixed read allocates on the heap, bounded by the declared
//! length.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{AnmError, Result};

/// Maps stream truncation to the dedicated error variant.
pub(crate) fn map_eof(e: io::Error) -> AnmError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        AnmError::UnexpectedEof
    } else {
        AnmError::Io(e)
    }
}

/// Extension trait for reading ANM primitives from a reader
pub trait ReadExt: Read {
    fn read_u8(&mut self) -> Result<u8> {
        ReadBytesExt::read_u8(self).map_err(map_eof)
    }

    fn read_i8(&mut self) -> Result<i8> {
        ReadBytesExt::read_i8(self).map_err(map_eof)
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        ReadBytesExt::read_u16::<LittleEndian>(self).map_err(map_eof)
    }

    fn read_i16_le(&mut self) -> Result<i16> {
        ReadBytesExt::read_i16::<LittleEndian>(self).map_err(map_eof)
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        ReadBytesExt::read_u32::<LittleEndian>(self).map_err(map_eof)
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        ReadBytesExt::read_i32::<LittleEndian>(self).map_err(map_eof)
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        ReadBytesExt::read_f32::<LittleEndian>(self).map_err(map_eof)
    }

    fn read_f64_le(&mut self) -> Result<f64> {
        ReadBytesExt::read_f64::<LittleEndian>(self).map_err(map_eof)
    }

    /// Any non-zero byte is true.
    fn read_bool(&mut self) -> Result<bool> {
        Ok(ReadExt::read_u8(self)? != 0)
    }

    /// Reads a u16 byte-length prefix, then exactly that many UTF-8 bytes.
    fn read_tagged_string(&mut self) -> Result<String> {
        let length = ReadExt::read_u16_le(self)?;
        let mut buf = vec![0u8; usize::from(length)];
        self.read_exact(&mut buf).map_err(map_eof)?;
        String::from_utf8(buf).map_err(|_| AnmError::InvalidEncoding)
    }
}

/// Extension trait for writing ANM primitives to a writer
pub trait WriteExt: Write {
    fn write_u8(&mut self, n: u8) -> Result<()> {
        WriteBytesExt::write_u8(self, n).map_err(AnmError::Io)
    }

    fn write_i8(&mut self, n: i8) -> Result<()> {
        WriteBytesExt::write_i8(self, n).map_err(AnmError::Io)
    }

    fn write_u16_le(&mut self, n: u16) -> Result<()> {
        WriteBytesExt::write_u16::<LittleEndian>(self, n).map_err(AnmError::Io)
    }

    fn write_i16_le(&mut self, n: i16) -> Result<()> {
        WriteBytesExt::write_i16::<LittleEndian>(self, n).map_err(AnmError::Io)
    }

    fn write_u32_le(&mut self, n: u32) -> Result<()> {
        WriteBytesExt::write_u32::<LittleEndian>(self, n).map_err(AnmError::Io)
    }

    fn write_i32_le(&mut self, n: i32) -> Result<()> {
        WriteBytesExt::write_i32::<LittleEndian>(self, n).map_err(AnmError::Io)
    }

    fn write_f32_le(&mut self, n: f32) -> Result<()> {
        WriteBytesExt::write_f32::<LittleEndian>(self, n).map_err(AnmError::Io)
    }

    fn write_f64_le(&mut self, n: f64) -> Result<()> {
        WriteBytesExt::write_f64::<LittleEndian>(self, n).map_err(AnmError::Io)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        WriteExt::write_u8(self, u8::from(value))
    }

    /// Writes a u16 byte-length prefix followed by the raw UTF-8 bytes.
    ///
    /// Fails with [`AnmError::StringTooLong`] before writing anything if the
    /// string does not fit the prefix. This is a hard protocol limit.
    fn write_tagged_string(&mut self, value: &str) -> Result<()> {
        let length = u16::try_from(value.len()).map_err(|_| AnmError::StringTooLong)?;
        WriteExt::write_u16_le(self, length)?;
        self.write_all(value.as_bytes()).map_err(AnmError::Io)
    }
}

impl<R: Read + ?Sized> ReadExt for R {}
impl<W: Write + ?Sized> WriteExt for W {}

/// Read wrapper that tracks the number of bytes consumed so far.
///
/// Used to report the decompressed-stream offset in decode errors.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes consumed from the underlying reader so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_primitive_round_trip() {
        let mut buf = Vec::new();
        buf.write_i16_le(-2).unwrap();
        buf.write_u32_le(0xDEAD_BEEF).unwrap();
        buf.write_f32_le(1.5).unwrap();
        buf.write_f64_le(-0.25).unwrap();
        buf.write_bool(true).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_i16_le().unwrap(), -2);
        assert_eq!(cursor.read_u32_le().unwrap(), 0xDEAD_BEEF);
        assert_eq!(cursor.read_f32_le().unwrap(), 1.5);
        assert_eq!(cursor.read_f64_le().unwrap(), -0.25);
        assert!(cursor.read_bool().unwrap());
    }

    #[test]
    fn test_bool_accepts_any_nonzero_byte() {
        let mut cursor = Cursor::new(vec![0u8, 1, 2, 255]);
        assert!(!cursor.read_bool().unwrap());
        assert!(cursor.read_bool().unwrap());
        assert!(cursor.read_bool().unwrap());
        assert!(cursor.read_bool().unwrap());
    }

    #[test]
    fn test_truncated_field_is_unexpected_eof() {
        let mut cursor = Cursor::new(vec![0x01u8, 0x02, 0x03]);
        let err = cursor.read_u32_le().unwrap_err();
        assert!(matches!(err, AnmError::UnexpectedEof));
    }

    #[test]
    fn test_tagged_string_round_trip() {
        let mut buf = Vec::new();
        buf.write_tagged_string("a__AnimationBow").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_tagged_string().unwrap(), "a__AnimationBow");
    }

    #[test]
    fn test_tagged_string_length_longer_than_stream() {
        // prefix says 5 bytes, only 2 present
        let mut cursor = Cursor::new(vec![5u8, 0, b'h', b'i']);
        let err = cursor.read_tagged_string().unwrap_err();
        assert!(matches!(err, AnmError::UnexpectedEof));
    }

    #[test]
    fn test_tagged_string_invalid_utf8() {
        let mut cursor = Cursor::new(vec![2u8, 0, 0xFF, 0xFE]);
        let err = cursor.read_tagged_string().unwrap_err();
        assert!(matches!(err, AnmError::InvalidEncoding));
    }

    #[test]
    fn test_string_at_u16_limit() {
        let at_limit = "a".repeat(65_535);
        let mut buf = Vec::new();
        buf.write_tagged_string(&at_limit).unwrap();
        assert_eq!(buf.len(), 2 + 65_535);

        let over_limit = "a".repeat(65_536);
        let mut buf = Vec::new();
        let err = buf.write_tagged_string(&over_limit).unwrap_err();
        assert!(matches!(err, AnmError::StringTooLong));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_counting_reader_position() {
        let mut reader = CountingReader::new(Cursor::new(vec![0u8; 16]));
        assert_eq!(reader.position(), 0);
        reader.read_u32_le().unwrap();
        reader.read_bool().unwrap();
        assert_eq!(reader.position(), 5);
    }
}
