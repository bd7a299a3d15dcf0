//! Parser and writer for Brawlhalla `.anm` animation containers.
//!
//! An ANM file is a zlib-compressed bundle of animation classes. Each
//! class holds named animations, each animation a list of frames, each
//! frame a list of bone poses. The binary grammar is heavily
//! delta-compressed: bones can be cloned from the previous frame, share
//! fields with their neighbor in the same frame, and collapse common
//! transforms down to a pair of indicator bytes. Decoding is a lossless
//! walk into an owned tree; re-encoding produces a stream the game loads
//! unchanged.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use brawl_anm::AnmFile;
//!
//! let file = File::open("Animation_Hero.anm").unwrap();
//! let anm = AnmFile::parse(&mut BufReader::new(file)).unwrap();
//! for (name, class) in &anm.classes {
//!     println!("{name}: {} animations", class.animations.len());
//! }
//! ```

pub mod animation;
pub mod bone;
pub mod class;
pub mod error;
pub mod file;
pub mod frame;
pub mod io;
pub mod version;

#[cfg(feature = "async")]
pub mod async_io;

pub use animation::AnmAnimation;
pub use bone::AnmBone;
pub use class::AnmClass;
pub use error::{AnmError, Result};
pub use file::AnmFile;
pub use frame::{AnmFrame, AnmOffset};
pub use version::AnmVersion;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
