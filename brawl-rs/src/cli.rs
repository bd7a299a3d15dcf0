//! Root CLI structure for brawl-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brawl-rs")]
#[command(about = "Command-line tools for Brawlhalla file formats", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ANM animation container operations
    Anm {
        #[command(subcommand)]
        command: crate::commands::anm::AnmCommands,
    },
}
