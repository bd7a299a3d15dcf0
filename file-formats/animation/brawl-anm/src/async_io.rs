//! Suspension-capable I/O entry points (feature = "async")
//!
//! The grammar walk itself is deterministic, CPU-bound work shared with the
//! sync path; only the byte transport suspends. [`AnmFile::parse_async`]
//! reads the header word and the compressed payload at await points, then
//! inflates and walks the staged buffer. Because every field is decoded
//! from staged bytes, cancellation can never leave a field half-consumed —
//! dropping the future mid-transfer leaves the stream position undefined,
//! so a cancelled stream must be discarded, not reused.

use std::io::Cursor;

use flate2::read::ZlibDecoder;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{AnmError, Result};
use crate::file::AnmFile;
use crate::io::{CountingReader, map_eof};
use crate::version::AnmVersion;

/// Reads a single-byte boolean from an async stream.
pub async fn read_bool<R: AsyncRead + Unpin>(reader: &mut R) -> Result<bool> {
    Ok(reader.read_u8().await.map_err(map_eof)? != 0)
}

/// Reads a tagged string (u16 length prefix + UTF-8 bytes) from an async
/// stream. The allocation is bounded by the declared length.
pub async fn read_tagged_string<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String> {
    let length = reader.read_u16_le().await.map_err(map_eof)?;
    let mut buf = vec![0u8; usize::from(length)];
    reader.read_exact(&mut buf).await.map_err(map_eof)?;
    String::from_utf8(buf).map_err(|_| AnmError::InvalidEncoding)
}

/// Writes a tagged string to an async stream, enforcing the u16 limit.
pub async fn write_tagged_string<W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &str,
) -> Result<()> {
    let length = u16::try_from(value.len()).map_err(|_| AnmError::StringTooLong)?;
    writer.write_u16_le(length).await.map_err(AnmError::Io)?;
    writer.write_all(value.as_bytes()).await.map_err(AnmError::Io)
}

impl AnmFile {
    /// Parses a complete ANM container from an async reader.
    pub async fn parse_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self> {
        let header = reader.read_i32_le().await.map_err(map_eof)?;
        // dispatch before staging the payload, so a bad header fails fast
        let version = AnmVersion::from_header(header)?;
        log::debug!("anm header {header}, {version} grammar");

        let mut compressed = Vec::new();
        reader
            .read_to_end(&mut compressed)
            .await
            .map_err(map_eof)?;

        let mut decompressed =
            CountingReader::new(ZlibDecoder::new(Cursor::new(compressed)));
        let classes = Self::parse_classes(&mut decompressed, version)?;
        Ok(Self { header, classes })
    }

    /// Encodes the container and writes it to an async writer.
    pub async fn write_async<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes).await.map_err(AnmError::Io)?;
        writer.flush().await.map_err(AnmError::Io)
    }
}
