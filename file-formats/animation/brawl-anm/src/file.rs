//! Top-level ANM container codec
//!
//! On disk a file is a raw 4-byte header word followed by a single zlib
//! stream. Inside the stream, classes are framed as a continuation-flag
//! list: `0x01 key class` repeated, terminated by `0x00`. Nothing is read
//! past the terminator.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::class::AnmClass;
use crate::error::{AnmError, Result};
use crate::io::{CountingReader, ReadExt, WriteExt};
use crate::version::AnmVersion;

/// A decoded ANM container
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnmFile {
    /// Raw header word; the game data build number. Selects the grammar
    /// revision and is written back verbatim.
    pub header: i32,
    /// Animation classes keyed by export name
    pub classes: BTreeMap<String, AnmClass>,
}

impl AnmFile {
    /// Parses a complete ANM container from a reader.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let header = reader.read_i32_le()?;
        let version = AnmVersion::from_header(header)?;
        log::debug!("anm header {header}, {version} grammar");

        let mut decompressed = CountingReader::new(ZlibDecoder::new(reader));
        let classes = Self::parse_classes(&mut decompressed, version)?;
        Ok(Self { header, classes })
    }

    pub(crate) fn parse_classes<R: Read>(
        decompressed: &mut CountingReader<R>,
        version: AnmVersion,
    ) -> Result<BTreeMap<String, AnmClass>> {
        let mut classes = BTreeMap::new();
        while decompressed.read_bool()? {
            let key = decompressed.read_tagged_string()?;
            let class = match AnmClass::parse(decompressed, version) {
                Ok(class) => class,
                Err(e) => {
                    let offset = decompressed.position();
                    return Err(e.context(format!(
                        "class '{key}' (near decompressed offset {offset})"
                    )));
                }
            };
            classes.insert(key, class);
        }
        log::debug!("decoded {} animation classes", classes.len());
        Ok(classes)
    }

    /// Writes the container: header word, then one zlib stream holding the
    /// terminated class list.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let version = AnmVersion::from_header(self.header)?;
        writer.write_i32_le(self.header)?;

        let mut compressed = ZlibEncoder::new(writer, Compression::best());
        for (key, class) in &self.classes {
            compressed.write_bool(true)?;
            compressed.write_tagged_string(key)?;
            class
                .write(&mut compressed, version)
                .map_err(|e| e.context(format!("class '{key}'")))?;
        }
        compressed.write_bool(false)?;
        compressed.finish().map_err(AnmError::Io)?;
        Ok(())
    }

    /// Decodes a container from an in-memory byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&mut Cursor::new(bytes))
    }

    /// Encodes the container to an in-memory byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}
