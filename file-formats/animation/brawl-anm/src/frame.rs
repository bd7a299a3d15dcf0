//! Animation frame codec
//!
//! Frames are where the format's frame-to-frame delta compression lives:
//! each bone slot can either be decoded in full or cloned wholesale from
//! the same slot of the previous frame, optionally overriding just the
//! sub-frame index. Slots correspond positionally, so a frame can only be
//! decoded with its predecessor already materialized.

use std::io::{Read, Write};

use crate::bone::AnmBone;
use crate::error::{AnmError, Result};
use crate::io::{ReadExt, WriteExt};
use crate::version::AnmVersion;

/// A 2D offset measured in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnmOffset {
    pub x: f64,
    pub y: f64,
}

/// A single animation frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnmFrame {
    /// Frame identifier
    pub id: i16,
    /// Offset of the projectile spawn socket, if the frame has one
    pub fire_socket: Option<AnmOffset>,
    /// Moving-platform offset; unused by the game but round-tripped
    pub eb_platform_pos: Option<AnmOffset>,
    /// Moving-platform rotation; only 904 streams carry it, unconditionally.
    /// Unused by the game and preserved verbatim (0.0 in newer streams).
    pub eb_platform_rot: f64,
    /// Bone poses; slot i corresponds to slot i of the previous frame
    pub bones: Vec<AnmBone>,
}

impl AnmFrame {
    /// Parses one frame, resolving clone references against `prev_frame`.
    pub fn parse<R: Read>(
        reader: &mut R,
        version: AnmVersion,
        prev_frame: Option<&AnmFrame>,
    ) -> Result<Self> {
        let id = reader.read_i16_le()?;
        let fire_socket = Self::parse_offset(reader)?;
        let eb_platform_pos = Self::parse_offset(reader)?;
        let eb_platform_rot = if version.has_platform_rotation() {
            reader.read_f64_le()?
        } else {
            0.0
        };

        // signed on the wire, but never meaningfully negative
        let bone_count = reader.read_i16_le()? as u16;
        let mut bones = Vec::with_capacity(usize::from(bone_count));
        for i in 0..usize::from(bone_count) {
            let bone = Self::parse_bone_slot(reader, version, prev_frame, &bones, i)
                .map_err(|e| e.context(format!("bone {i}")))?;
            bones.push(bone);
        }

        Ok(Self {
            id,
            fire_socket,
            eb_platform_pos,
            eb_platform_rot,
            bones,
        })
    }

    fn parse_bone_slot<R: Read>(
        reader: &mut R,
        version: AnmVersion,
        prev_frame: Option<&AnmFrame>,
        decoded: &[AnmBone],
        slot: usize,
    ) -> Result<AnmBone> {
        if reader.read_bool()? {
            let prev = prev_frame.ok_or(AnmError::BoneDuplicationInFirstFrame)?;
            let template = prev
                .bones
                .get(slot)
                .ok_or(AnmError::BoneDuplicationWithoutMatch)?;
            let mut bone = template.clone();
            if !reader.read_bool()? {
                bone.frame = version.read_frame_override(reader)?;
            }
            Ok(bone)
        } else {
            AnmBone::parse(reader, version, decoded.last())
        }
    }

    fn parse_offset<R: Read>(reader: &mut R) -> Result<Option<AnmOffset>> {
        if reader.read_bool()? {
            let x = reader.read_f64_le()?;
            let y = reader.read_f64_le()?;
            Ok(Some(AnmOffset { x, y }))
        } else {
            Ok(None)
        }
    }

    /// Writes one frame, taking the clone path for every bone that is a
    /// partial clone of its same-slot predecessor.
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        version: AnmVersion,
        prev_frame: Option<&AnmFrame>,
    ) -> Result<()> {
        writer.write_i16_le(self.id)?;
        Self::write_offset(writer, self.fire_socket)?;
        Self::write_offset(writer, self.eb_platform_pos)?;
        if version.has_platform_rotation() {
            writer.write_f64_le(self.eb_platform_rot)?;
        }

        writer.write_i16_le(self.bones.len() as i16)?;
        for (i, bone) in self.bones.iter().enumerate() {
            let result = match self.clone_template(prev_frame, i, bone) {
                Some(template) => {
                    writer.write_bool(true)?;
                    if bone.frame == template.frame {
                        writer.write_bool(true)
                    } else {
                        writer.write_bool(false)?;
                        version.write_frame_override(writer, bone.frame)
                    }
                }
                None => {
                    writer.write_bool(false)?;
                    let prev_in_frame = if i == 0 { None } else { self.bones.get(i - 1) };
                    bone.write(writer, version, prev_in_frame)
                }
            };
            result.map_err(|e| e.context(format!("bone {i}")))?;
        }
        Ok(())
    }

    fn write_offset<W: Write>(writer: &mut W, offset: Option<AnmOffset>) -> Result<()> {
        match offset {
            Some(offset) => {
                writer.write_bool(true)?;
                writer.write_f64_le(offset.x)?;
                writer.write_f64_le(offset.y)
            }
            None => writer.write_bool(false),
        }
    }

    /// The bone of `prev_frame` this slot would clone, if eligible.
    fn clone_template<'a>(
        &self,
        prev_frame: Option<&'a AnmFrame>,
        slot: usize,
        bone: &AnmBone,
    ) -> Option<&'a AnmBone> {
        prev_frame
            .and_then(|prev| prev.bones.get(slot))
            .filter(|template| bone.is_partial_clone_of(template))
    }

    /// Number of bytes [`AnmFrame::write`] will emit for this frame.
    ///
    /// Must be summed across an animation's frames (with the same
    /// predecessor chaining the writer uses) before the animation header
    /// can be written, because the header declares the total frame bytes.
    pub fn byte_count(&self, version: AnmVersion, prev_frame: Option<&AnmFrame>) -> u32 {
        let mut size = 2 + 1 + 1; // id, two offset indicators
        if self.fire_socket.is_some() {
            size += 2 * 8;
        }
        if self.eb_platform_pos.is_some() {
            size += 2 * 8;
        }
        if version.has_platform_rotation() {
            size += 8;
        }
        size += 2; // bone count

        for (i, bone) in self.bones.iter().enumerate() {
            size += 1; // clone indicator
            match self.clone_template(prev_frame, i, bone) {
                Some(template) => {
                    size += 1; // keep-frame indicator
                    if bone.frame != template.frame {
                        size += version.frame_override_size();
                    }
                }
                None => {
                    let prev_in_frame = if i == 0 { None } else { self.bones.get(i - 1) };
                    size += bone.byte_count(version, prev_in_frame);
                }
            }
        }
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::DEFAULT_SUB_FRAME;
    use std::io::Cursor;

    fn frame_with_bone(bone: AnmBone) -> AnmFrame {
        AnmFrame {
            id: 0,
            fire_socket: None,
            eb_platform_pos: None,
            eb_platform_rot: 0.0,
            bones: vec![bone],
        }
    }

    fn posed_bone() -> AnmBone {
        AnmBone {
            id: 4,
            scale_x: 0.5,
            rotate_skew_0: 1.0,
            rotate_skew_1: 2.0,
            scale_y: 4.0,
            x: -1.0,
            y: 1.0,
            opacity: 1.0,
            frame: DEFAULT_SUB_FRAME,
        }
    }

    #[test]
    fn test_clone_with_frame_override_round_trips() {
        let first = frame_with_bone(posed_bone());
        let second = frame_with_bone(AnmBone {
            frame: 2,
            ..posed_bone()
        });

        let mut buf = Vec::new();
        second.write(&mut buf, AnmVersion::Latest, Some(&first)).unwrap();
        assert_eq!(
            buf.len() as u32,
            second.byte_count(AnmVersion::Latest, Some(&first))
        );

        let parsed =
            AnmFrame::parse(&mut Cursor::new(buf), AnmVersion::Latest, Some(&first)).unwrap();
        assert_eq!(parsed, second);
        assert_eq!(parsed.bones[0].frame, 2);
    }

    #[test]
    fn test_clone_encoding_is_smaller_than_standalone() {
        let first = frame_with_bone(posed_bone());
        let second = frame_with_bone(AnmBone {
            frame: 2,
            ..posed_bone()
        });

        let chained = second.byte_count(AnmVersion::Latest, Some(&first));
        let standalone = second.byte_count(AnmVersion::Latest, None);
        assert!(chained < standalone);
    }

    #[test]
    fn test_clone_flag_in_first_frame_fails_without_reading_on() {
        // id, no fire socket, no platform pos, one bone slot, clone flag set
        let bytes = vec![0u8, 0, 0, 0, 1, 0, 1];
        let mut cursor = Cursor::new(bytes);
        let err = AnmFrame::parse(&mut cursor, AnmVersion::Latest, None).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            AnmError::BoneDuplicationInFirstFrame
        ));
        // everything up to and including the clone flag was consumed, nothing after
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_clone_flag_beyond_previous_frame_fails() {
        let first = frame_with_bone(posed_bone());

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i16.to_le_bytes()); // id
        bytes.extend_from_slice(&[0, 0]); // no offsets
        bytes.extend_from_slice(&2i16.to_le_bytes()); // two bone slots
        bytes.push(1); // slot 0 clones
        bytes.push(1); // keep frame
        bytes.push(1); // slot 1 clones, but the previous frame has one bone

        let err = AnmFrame::parse(&mut Cursor::new(bytes), AnmVersion::Latest, Some(&first))
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            AnmError::BoneDuplicationWithoutMatch
        ));
    }

    #[test]
    fn test_v904_platform_rotation_round_trips() {
        let frame = AnmFrame {
            id: 5,
            fire_socket: Some(AnmOffset { x: 1.5, y: -2.5 }),
            eb_platform_pos: Some(AnmOffset { x: 100.0, y: 200.0 }),
            eb_platform_rot: 0.125,
            bones: vec![posed_bone()],
        };

        let mut buf = Vec::new();
        frame.write(&mut buf, AnmVersion::V904, None).unwrap();
        assert_eq!(buf.len() as u32, frame.byte_count(AnmVersion::V904, None));

        let parsed = AnmFrame::parse(&mut Cursor::new(buf), AnmVersion::V904, None).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_in_frame_sharing_chains_through_slots() {
        let shared = posed_bone();
        let frame = AnmFrame {
            id: 1,
            fire_socket: None,
            eb_platform_pos: None,
            eb_platform_rot: 0.0,
            bones: vec![
                shared.clone(),
                AnmBone {
                    id: 5,
                    ..shared.clone()
                },
                AnmBone {
                    id: 6,
                    x: 50.0,
                    ..shared
                },
            ],
        };

        let mut buf = Vec::new();
        frame.write(&mut buf, AnmVersion::Latest, None).unwrap();
        assert_eq!(buf.len() as u32, frame.byte_count(AnmVersion::Latest, None));

        let parsed = AnmFrame::parse(&mut Cursor::new(buf), AnmVersion::Latest, None).unwrap();
        assert_eq!(parsed, frame);
    }
}
