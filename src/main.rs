//! # Tasky - Academic Task Tracker
//!
//! A single-user task tracker for academic work, with a CLI for automation
//! and a board-style terminal UI for visual management.
//!
//! ## Key Features
//!
//! - **One flat JSON file**: the whole collection is loaded at start and
//!   rewritten on every mutation; a corrupt file is recovered by starting
//!   fresh, never by crashing.
//! - **Pure view pipeline**: search, priority/subject filters, date and
//!   priority sorting, and the three-column board (pending / completed /
//!   overdue) are all computed by pure functions over the collection.
//! - **Derived overdue**: whether a task shows as overdue is always computed
//!   from its due date at render time; only pending/completed is stored.
//! - **Legacy tolerant**: task files written by earlier versions (Spanish
//!   field values, stored board columns) load and normalise cleanly.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the board UI
//! tasky ui
//!
//! # Add a task via CLI
//! tasky add "Study for finals" --subject Math --priority high --due 2025-06-20
//!
//! # Flat list, filtered and sorted
//! tasky list --subject Math --sort date-asc
//!
//! # Text board with per-column counts
//! tasky board
//! ```
//!
//! Data is stored in `~/.tasky/tasks.json` unless `--db` points elsewhere.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod fields;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    // Completions need no task file at all.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".tasky");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create data directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir.join("tasks.json")
    });

    if let Commands::Ui = &cli.command {
        cmd_ui(&db_path);
        return;
    }

    let mut store = TaskStore::load(&db_path);

    match cli.command {
        Commands::Ui => unreachable!("UI command handled above"),
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Add { title, desc, subject, priority, due } =>
            cmd_add(&mut store, &db_path, title, desc, subject, priority, due),

        Commands::List { search, priority, subject, sort } =>
            cmd_list(&store, search, priority, subject, sort),

        Commands::Board { search, priority, subject, sort } =>
            cmd_board(&store, search, priority, subject, sort),

        Commands::View { id } => cmd_view(&store, id),

        Commands::Update { id, title, desc, subject, priority, due } =>
            cmd_update(&mut store, &db_path, id, title, desc, subject, priority, due),

        Commands::Done { id } => cmd_done(&mut store, &db_path, id),

        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),

        Commands::Subjects => cmd_subjects(&store),

        Commands::Export { output } => cmd_export(&store, output),

        Commands::Import { input } => cmd_import(&mut store, &db_path, input),
    }
}
