//! Animation class codec
//!
//! A class bundles the animations of one sprite, keyed by animation name.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::animation::AnmAnimation;
use crate::error::Result;
use crate::io::{ReadExt, WriteExt};
use crate::version::AnmVersion;

/// A named group of animations belonging to one sprite
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnmClass {
    /// Export index of the sprite inside its source file
    pub index: String,
    /// Name of the source art file the sprite came from
    pub file_name: String,
    /// Animations keyed by their own `name` field
    pub animations: BTreeMap<String, AnmAnimation>,
}

impl AnmClass {
    /// Parses one class, keying each animation by its own name.
    pub fn parse<R: Read>(reader: &mut R, version: AnmVersion) -> Result<Self> {
        let index = reader.read_tagged_string()?;
        let file_name = reader.read_tagged_string()?;

        let animation_count = reader.read_u32_le()?;
        let mut animations = BTreeMap::new();
        for i in 0..animation_count {
            let animation = AnmAnimation::parse(reader, version)
                .map_err(|e| e.context(format!("animation {i}")))?;
            animations.insert(animation.name.clone(), animation);
        }

        Ok(Self {
            index,
            file_name,
            animations,
        })
    }

    /// Writes one class. Iteration order is the map's sorted order, which
    /// keeps repeated encodes of the same tree byte-identical.
    pub fn write<W: Write>(&self, writer: &mut W, version: AnmVersion) -> Result<()> {
        writer.write_tagged_string(&self.index)?;
        writer.write_tagged_string(&self.file_name)?;
        writer.write_u32_le(self.animations.len() as u32)?;
        for animation in self.animations.values() {
            animation
                .write(writer, version)
                .map_err(|e| e.context(format!("animation '{}'", animation.name)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_animations_keyed_by_their_own_name() {
        let mut class = AnmClass {
            index: "a__SpriteHero".to_string(),
            file_name: "Animation_Hero.swf".to_string(),
            animations: BTreeMap::new(),
        };
        for name in ["Idle", "Run"] {
            let animation = AnmAnimation {
                name: name.to_string(),
                ..AnmAnimation::default()
            };
            class.animations.insert(animation.name.clone(), animation);
        }

        let mut buf = Vec::new();
        class.write(&mut buf, AnmVersion::Latest).unwrap();
        let parsed = AnmClass::parse(&mut Cursor::new(buf), AnmVersion::Latest).unwrap();

        assert_eq!(parsed, class);
        for (key, animation) in &parsed.animations {
            assert_eq!(*key, animation.name);
        }
    }
}
