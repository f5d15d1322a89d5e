mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump { level, json } => {
            commands::dump::handle(&level, json)?;
        }

        Commands::Info { level } => {
            commands::info::handle(&level)?;
        }

        Commands::Bundle { file, all } => {
            commands::bundle::handle(&file, all)?;
        }

        Commands::Rewrite { level, output } => {
            commands::rewrite::handle(&level, output.as_deref())?;
        }
    }

    Ok(())
}
