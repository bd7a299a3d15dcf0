//! Named animation codec

use std::io::{Read, Write};

use crate::error::Result;
use crate::frame::AnmFrame;
use crate::io::{ReadExt, WriteExt};
use crate::version::AnmVersion;

/// A named animation: metadata, an opaque data block and the frame list
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnmAnimation {
    /// Animation name; also the key under which the class stores it
    pub name: String,
    /// First frame of the loop section
    pub loop_start: u32,
    /// First frame of the recovery section
    pub recovery_start: u32,
    /// First frame of the free section
    pub free_start: u32,
    /// Frame shown in menu previews
    pub preview_frame: u32,
    /// First frame of the base section
    pub base_start: u32,
    /// Opaque consumer-defined values, order-significant
    pub data: Vec<u32>,
    /// Frames in playback order; each may delta-reference its predecessor
    pub frames: Vec<AnmFrame>,
}

impl AnmAnimation {
    /// Parses one animation, threading each frame with its predecessor.
    pub fn parse<R: Read>(reader: &mut R, version: AnmVersion) -> Result<Self> {
        let name = reader.read_tagged_string()?;
        let frame_count = reader.read_u32_le()?;
        let loop_start = reader.read_u32_le()?;
        let recovery_start = reader.read_u32_le()?;
        let free_start = reader.read_u32_le()?;
        let preview_frame = reader.read_u32_le()?;
        let base_start = reader.read_u32_le()?;

        let data_size = reader.read_u32_le()?;
        // reservation capped; the stream itself bounds the real growth
        let mut data = Vec::with_capacity(data_size.min(1024) as usize);
        for _ in 0..data_size {
            data.push(reader.read_u32_le()?);
        }

        // The game uses this size to load frames on demand. Parsing them
        // eagerly, we only need to consume it.
        let declared_frames_size = reader.read_u32_le()?;
        log::trace!("animation {name:?} declares {declared_frames_size} frame bytes");

        let mut frames = Vec::with_capacity(frame_count.min(1024) as usize);
        for i in 0..frame_count {
            let frame = AnmFrame::parse(reader, version, frames.last())
                .map_err(|e| e.context(format!("frame {i}")))?;
            frames.push(frame);
        }

        Ok(Self {
            name,
            loop_start,
            recovery_start,
            free_start,
            preview_frame,
            base_start,
            data,
            frames,
        })
    }

    /// Writes one animation, computing the declared frame byte size before
    /// any frame is emitted.
    pub fn write<W: Write>(&self, writer: &mut W, version: AnmVersion) -> Result<()> {
        writer.write_tagged_string(&self.name)?;
        writer.write_u32_le(self.frames.len() as u32)?;
        writer.write_u32_le(self.loop_start)?;
        writer.write_u32_le(self.recovery_start)?;
        writer.write_u32_le(self.free_start)?;
        writer.write_u32_le(self.preview_frame)?;
        writer.write_u32_le(self.base_start)?;

        writer.write_u32_le(self.data.len() as u32)?;
        for datum in &self.data {
            writer.write_u32_le(*datum)?;
        }

        writer.write_u32_le(self.frames_byte_count(version))?;
        for (i, frame) in self.frames.iter().enumerate() {
            let prev_frame = if i == 0 { None } else { self.frames.get(i - 1) };
            frame
                .write(writer, version, prev_frame)
                .map_err(|e| e.context(format!("frame {i}")))?;
        }
        Ok(())
    }

    /// Total bytes the frame list will occupy, chained exactly like the
    /// writer chains it.
    pub fn frames_byte_count(&self, version: AnmVersion) -> u32 {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let prev_frame = if i == 0 { None } else { self.frames.get(i - 1) };
                frame.byte_count(version, prev_frame)
            })
            .sum()
    }
}
