//! Bone pose codec
//!
//! A bone is a 2x2 affine transform (`scale_x`, `rotate_skew_0`,
//! `rotate_skew_1`, `scale_y`), a position, an opacity and a display
//! sub-frame index. On the wire none of this is fixed-width: the transform
//! collapses to an indicator pair for the identity and mirrored special
//! cases, and in the latest grammar a bone can instead share its transform
//! or position with the bone decoded just before it in the same frame.

use std::io::{Read, Write};

use crate::error::{AnmError, Result};
use crate::io::{ReadExt, WriteExt};
use crate::version::AnmVersion;

/// Sub-frame index bones carry unless the stream overrides it
pub const DEFAULT_SUB_FRAME: i16 = 1;

/// A single bone pose within an animation frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnmBone {
    /// Bone identifier, indexing the game's bone name table
    pub id: i16,
    /// Transform matrix entry a
    pub scale_x: f32,
    /// Transform matrix entry b
    pub rotate_skew_0: f32,
    /// Transform matrix entry c
    pub rotate_skew_1: f32,
    /// Transform matrix entry d
    pub scale_y: f32,
    /// Position x
    pub x: f32,
    /// Position y
    pub y: f32,
    /// Back-to-front alpha in [0, 1]; stored at byte precision when not 1.0
    pub opacity: f64,
    /// Display sub-frame index; 8 bits on the wire in the latest grammar,
    /// 16 bits in the legacy one
    pub frame: i16,
}

impl Default for AnmBone {
    fn default() -> Self {
        Self {
            id: 0,
            scale_x: 1.0,
            rotate_skew_0: 0.0,
            rotate_skew_1: 0.0,
            scale_y: 1.0,
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
            frame: DEFAULT_SUB_FRAME,
        }
    }
}

impl AnmBone {
    /// Returns true if the transform is the identity (unit scale, no skew)
    pub fn is_identity(&self) -> bool {
        self.scale_x == 1.0
            && self.rotate_skew_0 == 0.0
            && self.rotate_skew_1 == 0.0
            && self.scale_y == 1.0
    }

    /// Returns true if the transform is mirrored (`scale_y == -scale_x`)
    /// with equal skew components
    pub fn is_symmetric(&self) -> bool {
        self.scale_y == -self.scale_x && self.rotate_skew_0 == self.rotate_skew_1
    }

    /// Returns true if the bone equals `other` in every field except
    /// possibly `frame`
    pub fn is_partial_clone_of(&self, other: &AnmBone) -> bool {
        self.id == other.id
            && self.shares_transform_with(other)
            && self.x == other.x
            && self.y == other.y
            && self.opacity == other.opacity
    }

    fn shares_transform_with(&self, other: &AnmBone) -> bool {
        self.scale_x == other.scale_x
            && self.rotate_skew_0 == other.rotate_skew_0
            && self.rotate_skew_1 == other.rotate_skew_1
            && self.scale_y == other.scale_y
    }

    fn quantized_opacity(&self) -> u8 {
        (self.opacity * 255.0).round() as u8
    }

    /// Parses one bone.
    ///
    /// `prev_in_frame` is the bone decoded immediately before this one in
    /// the same frame; the latest grammar's sharing flags refer to it. The
    /// legacy grammar has no sharing flags and ignores it.
    pub fn parse<R: Read>(
        reader: &mut R,
        version: AnmVersion,
        prev_in_frame: Option<&AnmBone>,
    ) -> Result<Self> {
        match version {
            AnmVersion::V904 => Self::parse_v904(reader),
            AnmVersion::Latest => Self::parse_latest(reader, prev_in_frame),
        }
    }

    fn parse_latest<R: Read>(reader: &mut R, prev_in_frame: Option<&AnmBone>) -> Result<Self> {
        let id = reader.read_i16_le()?;
        let opaque = reader.read_bool()?;

        let (scale_x, rotate_skew_0, rotate_skew_1, scale_y) = if reader.read_bool()? {
            let prev = prev_in_frame.ok_or(AnmError::MissingPredecessor { field: "transform" })?;
            (prev.scale_x, prev.rotate_skew_0, prev.rotate_skew_1, prev.scale_y)
        } else if reader.read_bool()? {
            if reader.read_bool()? {
                (1.0, 0.0, 0.0, 1.0)
            } else {
                let scale_x = reader.read_f32_le()?;
                let rotate_skew_0 = reader.read_f32_le()?;
                (scale_x, rotate_skew_0, rotate_skew_0, -scale_x)
            }
        } else {
            (
                reader.read_f32_le()?,
                reader.read_f32_le()?,
                reader.read_f32_le()?,
                reader.read_f32_le()?,
            )
        };

        let (x, y) = if reader.read_bool()? {
            let prev = prev_in_frame.ok_or(AnmError::MissingPredecessor { field: "position" })?;
            (prev.x, prev.y)
        } else {
            (reader.read_f32_le()?, reader.read_f32_le()?)
        };

        let opacity = if opaque {
            1.0
        } else {
            f64::from(reader.read_u8()?) / 255.0
        };

        Ok(Self {
            id,
            scale_x,
            rotate_skew_0,
            rotate_skew_1,
            scale_y,
            x,
            y,
            opacity,
            frame: DEFAULT_SUB_FRAME,
        })
    }

    fn parse_v904<R: Read>(reader: &mut R) -> Result<Self> {
        let id = reader.read_i16_le()?;
        let opaque = reader.read_bool()?;

        let mut identity = false;
        let mut symmetric = false;
        if reader.read_bool()? {
            if reader.read_bool()? {
                identity = true;
            } else {
                symmetric = true;
            }
        }

        let (scale_x, rotate_skew_0, rotate_skew_1, scale_y) = if identity {
            (1.0, 0.0, 0.0, 1.0)
        } else {
            let scale_x = reader.read_f32_le()?;
            let rotate_skew_0 = reader.read_f32_le()?;
            if symmetric {
                (scale_x, rotate_skew_0, rotate_skew_0, -scale_x)
            } else {
                (scale_x, rotate_skew_0, reader.read_f32_le()?, reader.read_f32_le()?)
            }
        };

        let x = reader.read_f32_le()?;
        let y = reader.read_f32_le()?;
        let frame = reader.read_i16_le()?;
        let opacity = if opaque {
            1.0
        } else {
            f64::from(reader.read_u8()?) / 255.0
        };

        Ok(Self {
            id,
            scale_x,
            rotate_skew_0,
            rotate_skew_1,
            scale_y,
            x,
            y,
            opacity,
            frame,
        })
    }

    /// Writes one bone, choosing the sharing and special-case branches the
    /// decoder will reverse.
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        version: AnmVersion,
        prev_in_frame: Option<&AnmBone>,
    ) -> Result<()> {
        match version {
            AnmVersion::V904 => self.write_v904(writer),
            AnmVersion::Latest => self.write_latest(writer, prev_in_frame),
        }
    }

    fn write_latest<W: Write>(&self, writer: &mut W, prev_in_frame: Option<&AnmBone>) -> Result<()> {
        writer.write_i16_le(self.id)?;
        let opaque = self.opacity == 1.0;
        writer.write_bool(opaque)?;

        let share_transform = prev_in_frame.is_some_and(|prev| self.shares_transform_with(prev));
        writer.write_bool(share_transform)?;
        if !share_transform {
            if self.is_identity() {
                writer.write_bool(true)?;
                writer.write_bool(true)?;
            } else if self.is_symmetric() {
                writer.write_bool(true)?;
                writer.write_bool(false)?;
                writer.write_f32_le(self.scale_x)?;
                writer.write_f32_le(self.rotate_skew_0)?;
            } else {
                writer.write_bool(false)?;
                writer.write_f32_le(self.scale_x)?;
                writer.write_f32_le(self.rotate_skew_0)?;
                writer.write_f32_le(self.rotate_skew_1)?;
                writer.write_f32_le(self.scale_y)?;
            }
        }

        let share_position =
            prev_in_frame.is_some_and(|prev| self.x == prev.x && self.y == prev.y);
        writer.write_bool(share_position)?;
        if !share_position {
            writer.write_f32_le(self.x)?;
            writer.write_f32_le(self.y)?;
        }

        if !opaque {
            writer.write_u8(self.quantized_opacity())?;
        }
        Ok(())
    }

    fn write_v904<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16_le(self.id)?;
        let opaque = self.opacity == 1.0;
        writer.write_bool(opaque)?;

        let identity = self.is_identity();
        let symmetric = self.is_symmetric();
        if identity || symmetric {
            writer.write_bool(true)?;
            writer.write_bool(identity)?;
        } else {
            writer.write_bool(false)?;
        }

        if !identity {
            writer.write_f32_le(self.scale_x)?;
            writer.write_f32_le(self.rotate_skew_0)?;
            if !symmetric {
                writer.write_f32_le(self.rotate_skew_1)?;
                writer.write_f32_le(self.scale_y)?;
            }
        }

        writer.write_f32_le(self.x)?;
        writer.write_f32_le(self.y)?;
        writer.write_i16_le(self.frame)?;
        if !opaque {
            writer.write_u8(self.quantized_opacity())?;
        }
        Ok(())
    }

    /// Number of bytes [`AnmBone::write`] will emit for this bone.
    pub fn byte_count(&self, version: AnmVersion, prev_in_frame: Option<&AnmBone>) -> u32 {
        match version {
            AnmVersion::V904 => self.byte_count_v904(),
            AnmVersion::Latest => self.byte_count_latest(prev_in_frame),
        }
    }

    fn byte_count_latest(&self, prev_in_frame: Option<&AnmBone>) -> u32 {
        let mut size = 2 + 1 + 1; // id, opaque flag, transform sharing flag
        let share_transform = prev_in_frame.is_some_and(|prev| self.shares_transform_with(prev));
        if !share_transform {
            size += if self.is_identity() {
                2
            } else if self.is_symmetric() {
                2 + 2 * 4
            } else {
                1 + 4 * 4
            };
        }
        size += 1; // position sharing flag
        let share_position =
            prev_in_frame.is_some_and(|prev| self.x == prev.x && self.y == prev.y);
        if !share_position {
            size += 2 * 4;
        }
        if self.opacity != 1.0 {
            size += 1;
        }
        size
    }

    fn byte_count_v904(&self) -> u32 {
        let mut size = 2 + 1; // id, opaque flag
        let identity = self.is_identity();
        let symmetric = self.is_symmetric();
        size += if identity || symmetric { 2 } else { 1 };
        if !identity {
            size += 2 * 4;
            if !symmetric {
                size += 2 * 4;
            }
        }
        size += 2 * 4; // position
        size += 2; // sub-frame index
        if self.opacity != 1.0 {
            size += 1;
        }
        size
    }
}
