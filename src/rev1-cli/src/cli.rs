//! Command-line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rev1", about = "Inspect Overload level files and asset bundles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every command in a level file
    Dump {
        /// Path to the .level file
        level: PathBuf,

        /// Output the decoded command list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a summary of a level file
    Info {
        /// Path to the .level file
        level: PathBuf,
    },

    /// List material and game-object names in an asset bundle
    Bundle {
        /// Path to the bundle file
        file: PathBuf,

        /// List every game object, not just entity_ prefabs
        #[arg(long)]
        all: bool,
    },

    /// Re-encode a level file in place, normalizing its termination
    Rewrite {
        /// Path to the .level file
        level: PathBuf,

        /// Write to this path instead of replacing the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
