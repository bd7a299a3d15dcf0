//! Grammar revisions of the ANM container and the header dispatch
//!
//! The 4-byte header at the start of every file is the game data build
//! number. It is kept verbatim on [`crate::AnmFile`] so files re-encode
//! with their original header word; its only interpretation here is
//! selecting which grammar revision the rest of the stream uses.

use std::fmt;
use std::io::{Read, Write};

use crate::error::{AnmError, Result};
use crate::io::{ReadExt, WriteExt};

/// Represents the grammar revisions of ANM files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnmVersion {
    /// Data builds up to 904: every frame carries an unused platform
    /// rotation, bones store their sub-frame index inline as 16 bits, and
    /// there is no in-frame field sharing between adjacent bones
    V904,

    /// Latest revision: adjacent bones within a frame may share transform
    /// and position, the sub-frame index is implied unless overridden by
    /// the frame-cloning path, and the override is 8 bits wide
    #[default]
    Latest,
}

impl AnmVersion {
    /// Selects the grammar revision for the given header word.
    ///
    /// Build numbers up to 904 use the legacy grammar; anything newer uses
    /// the latest one. Values below 1 are not valid build numbers.
    pub fn from_header(header: i32) -> Result<Self> {
        match header {
            i32::MIN..=0 => Err(AnmError::UnsupportedVersion(header)),
            1..=904 => Ok(AnmVersion::V904),
            _ => Ok(AnmVersion::Latest),
        }
    }

    /// Returns true if frames in this revision carry the unused platform
    /// rotation double
    pub fn has_platform_rotation(self) -> bool {
        self == AnmVersion::V904
    }

    /// Returns true if bones in this revision may share transform or
    /// position with the preceding bone of the same frame
    pub fn has_in_frame_sharing(self) -> bool {
        self == AnmVersion::Latest
    }

    /// Width in bytes of the sub-frame override in the frame-cloning path
    pub(crate) fn frame_override_size(self) -> u32 {
        match self {
            AnmVersion::V904 => 2,
            AnmVersion::Latest => 1,
        }
    }

    pub(crate) fn read_frame_override<R: Read>(self, reader: &mut R) -> Result<i16> {
        match self {
            AnmVersion::V904 => reader.read_i16_le(),
            AnmVersion::Latest => Ok(i16::from(reader.read_i8()?)),
        }
    }

    pub(crate) fn write_frame_override<W: Write>(self, writer: &mut W, frame: i16) -> Result<()> {
        match self {
            AnmVersion::V904 => writer.write_i16_le(frame),
            AnmVersion::Latest => {
                let narrow = i8::try_from(frame).map_err(|_| AnmError::FrameOutOfRange(frame))?;
                writer.write_i8(narrow)
            }
        }
    }
}

impl fmt::Display for AnmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnmVersion::V904 => write!(f, "904"),
            AnmVersion::Latest => write!(f, "latest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_dispatch() {
        assert_eq!(AnmVersion::from_header(1).unwrap(), AnmVersion::V904);
        assert_eq!(AnmVersion::from_header(904).unwrap(), AnmVersion::V904);
        assert_eq!(AnmVersion::from_header(905).unwrap(), AnmVersion::Latest);
        assert_eq!(AnmVersion::from_header(1105).unwrap(), AnmVersion::Latest);
    }

    #[test]
    fn test_header_dispatch_rejects_non_builds() {
        assert!(matches!(
            AnmVersion::from_header(0),
            Err(AnmError::UnsupportedVersion(0))
        ));
        assert!(matches!(
            AnmVersion::from_header(-7),
            Err(AnmError::UnsupportedVersion(-7))
        ));
    }

    #[test]
    fn test_capability_matrix() {
        assert!(AnmVersion::V904.has_platform_rotation());
        assert!(!AnmVersion::V904.has_in_frame_sharing());
        assert!(!AnmVersion::Latest.has_platform_rotation());
        assert!(AnmVersion::Latest.has_in_frame_sharing());
    }

    #[test]
    fn test_frame_override_widths() {
        let mut buf = Vec::new();
        AnmVersion::V904.write_frame_override(&mut buf, 1000).unwrap();
        assert_eq!(buf.len(), 2);
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            AnmVersion::V904.read_frame_override(&mut cursor).unwrap(),
            1000
        );

        let mut buf = Vec::new();
        AnmVersion::Latest.write_frame_override(&mut buf, -5).unwrap();
        assert_eq!(buf.len(), 1);
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            AnmVersion::Latest.read_frame_override(&mut cursor).unwrap(),
            -5
        );
    }

    #[test]
    fn test_narrow_override_rejects_wide_values() {
        let mut buf = Vec::new();
        let err = AnmVersion::Latest
            .write_frame_override(&mut buf, 1000)
            .unwrap_err();
        assert!(matches!(err, AnmError::FrameOutOfRange(1000)));
        assert!(buf.is_empty());
    }
}
