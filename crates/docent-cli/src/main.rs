use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "docent")]
#[command(about = "Docent - turn documents into guided teaching walkthroughs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the teaching script for a document
    Script {
        /// Path to the document (plain text)
        file: PathBuf,

        /// Pick each unit's best role independently instead of
        /// balancing role shares
        #[arg(long)]
        greedy: bool,

        /// Emit the full script as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Optional TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Walk through a document turn by turn
    Walk {
        /// Path to the document (plain text)
        file: PathBuf,

        /// Simulate a user interruption at this unit
        #[arg(long)]
        interrupt_at: Option<usize>,

        /// Optional TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Script {
            file,
            greedy,
            json,
            config,
        } => commands::script::run(&file, greedy, json, config.as_deref())?,
        Commands::Walk {
            file,
            interrupt_at,
            config,
        } => commands::walk::run(&file, interrupt_at, config.as_deref())?,
    }

    Ok(())
}
