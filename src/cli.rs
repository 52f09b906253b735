use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed academic task tracker.
/// Storage defaults to ~/.tasky/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tasky", version, about = "Academic task tracker CLI")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
