//! ANM animation container command implementations

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use brawl_anm::{AnmFile, AnmVersion};

#[derive(Subcommand)]
pub enum AnmCommands {
    /// Display information about an ANM file
    Info {
        /// Path to the ANM file
        file: PathBuf,

        /// List every animation of every class
        #[arg(long)]
        animations: bool,
    },

    /// Decode an ANM file and report structural problems
    Validate {
        /// Path to the ANM file
        file: PathBuf,
    },

    /// Convert between binary ANM and its JSON projection
    ///
    /// The direction is taken from the file extensions: `.anm` to `.json`
    /// decodes, `.json` to `.anm` re-encodes.
    Convert {
        /// Path to the input file
        input: PathBuf,

        /// Path to write the converted file
        output: PathBuf,
    },
}

pub fn execute(command: AnmCommands) -> Result<()> {
    match command {
        AnmCommands::Info { file, animations } => info(&file, animations),
        AnmCommands::Validate { file } => validate(&file),
        AnmCommands::Convert { input, output } => convert(&input, &output),
    }
}

fn read_anm(path: &Path) -> Result<AnmFile> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    AnmFile::parse(&mut BufReader::new(file))
        .with_context(|| format!("cannot decode {}", path.display()))
}

fn info(path: &Path, list_animations: bool) -> Result<()> {
    let anm = read_anm(path)?;
    let version = AnmVersion::from_header(anm.header)?;

    println!("File: {}", path.display());
    println!("Header: {} ({version} grammar)", anm.header);
    println!("Classes: {}", anm.classes.len());

    for (name, class) in &anm.classes {
        println!("  {name} ({}): {} animations", class.file_name, class.animations.len());
        if list_animations {
            for animation in class.animations.values() {
                println!(
                    "    {}: {} frames, preview {}",
                    animation.name,
                    animation.frames.len(),
                    animation.preview_frame
                );
            }
        }
    }
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    match read_anm(path) {
        Ok(anm) => {
            let frames: usize = anm
                .classes
                .values()
                .flat_map(|class| class.animations.values())
                .map(|animation| animation.frames.len())
                .sum();
            println!(
                "OK: {} classes, {} total frames",
                anm.classes.len(),
                frames
            );
            Ok(())
        }
        Err(e) => bail!("invalid: {e:#}"),
    }
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let from_json = has_extension(input, "json");
    let to_json = has_extension(output, "json");

    let anm = if from_json {
        let file =
            File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot decode JSON from {}", input.display()))?
    } else {
        read_anm(input)?
    };

    let file =
        File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    if to_json {
        serde_json::to_writer_pretty(&mut writer, &anm)
            .with_context(|| format!("cannot write JSON to {}", output.display()))?;
    } else if from_json {
        anm.write(&mut writer)
            .with_context(|| format!("cannot encode {}", output.display()))?;
    } else {
        bail!("nothing to do: both paths are binary ANM");
    }

    log::info!("wrote {}", output.display());
    Ok(())
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_anm::{AnmClass, AnmVersion};
    use std::collections::BTreeMap;
    use std::io::Write;

    #[test]
    fn test_has_extension_is_case_insensitive() {
        assert!(has_extension(Path::new("tree.JSON"), "json"));
        assert!(!has_extension(Path::new("tree.anm"), "json"));
        assert!(!has_extension(Path::new("tree"), "json"));
    }

    #[test]
    fn test_convert_round_trips_through_json() {
        let mut classes = BTreeMap::new();
        classes.insert(
            "Hero".to_string(),
            AnmClass {
                index: "a__SpriteHero".to_string(),
                file_name: "Animation_Hero.swf".to_string(),
                animations: BTreeMap::new(),
            },
        );
        let anm = AnmFile {
            header: 1105,
            classes,
        };
        assert_eq!(
            AnmVersion::from_header(anm.header).unwrap(),
            AnmVersion::Latest
        );

        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("hero.anm");
        let json = dir.path().join("hero.json");
        let restored = dir.path().join("restored.anm");

        let mut file = File::create(&binary).unwrap();
        file.write_all(&anm.to_bytes().unwrap()).unwrap();
        drop(file);

        convert(&binary, &json).unwrap();
        convert(&json, &restored).unwrap();

        let parsed = read_anm(&restored).unwrap();
        assert_eq!(parsed, anm);
    }
}
