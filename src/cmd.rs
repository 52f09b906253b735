//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for the task subcommands, from
//! CRUD operations to the board/list renderings of the view pipeline and the
//! TUI launcher. Every mutation saves the whole store before reporting.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Local, TimeZone, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::fields::{Priority, SortMode, StoredStatus};
use crate::store::{
    format_derived_status, format_due_relative, format_priority, parse_due_input, truncate,
    TaskStore, UpdateError,
};
use crate::task::{Task, TaskDraft};
use crate::tui::run::run_tui;
use crate::view::{apply_view, build_board, derive_status, subjects, ViewState};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board interface.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Subject or course area the task belongs to.
        #[arg(long)]
        subject: String,
        /// Priority: high | medium | low.
        #[arg(long, value_enum)]
        priority: Priority,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: String,
    },

    /// List tasks as a flat table with optional search, filters and sort.
    List {
        /// Keep only tasks whose title, description or subject contains this.
        #[arg(long)]
        search: Option<String>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by subject (exact match).
        #[arg(long)]
        subject: Option<String>,
        /// Sort mode.
        #[arg(long, value_enum, default_value_t = SortMode::None)]
        sort: SortMode,
    },

    /// Show the three-column board (pending / completed / overdue).
    Board {
        /// Keep only tasks whose title, description or subject contains this.
        #[arg(long)]
        search: Option<String>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by subject (exact match).
        #[arg(long)]
        subject: Option<String>,
        /// Sort mode.
        #[arg(long, value_enum, default_value_t = SortMode::None)]
        sort: SortMode,
    },

    /// View a single task by id.
    View {
        /// Task id to view.
        id: u64,
    },

    /// Update fields on a task. Omitted flags keep the current value.
    Update {
        /// Task id to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
    },

    /// Toggle a task between pending and completed.
    Done {
        /// Task id to toggle.
        id: u64,
    },

    /// Delete a task by id. Deleting an absent id is a no-op.
    Delete {
        /// Task id to delete.
        id: u64,
    },

    /// List distinct subjects and task counts.
    Subjects,

    /// Export all tasks to a JSON file.
    Export {
        /// Output file path (default: tasks_export.json).
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Import tasks from a JSON file, appending with freshly minted ids.
    Import {
        /// Input JSON file path.
        input: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path) {
    if let Err(e) = run_tui(db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

fn save_or_exit(store: &TaskStore, db_path: &Path) {
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save task file: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the store.
pub fn cmd_add(
    store: &mut TaskStore,
    db_path: &Path,
    title: String,
    desc: Option<String>,
    subject: String,
    priority: Priority,
    due: String,
) {
    let Some(due) = parse_due_input(&due) else {
        eprintln!("Could not parse due date '{due}'. Use YYYY-MM-DD, \"today\", \"tomorrow\" or \"in Nd\".");
        std::process::exit(1);
    };
    let draft = TaskDraft {
        title,
        description: desc,
        subject,
        priority: Some(priority),
        due: Some(due),
    };
    match store.create(draft, Utc::now().timestamp()) {
        Ok(task) => {
            let id = task.id;
            save_or_exit(store, db_path);
            println!("Added task {id}");
        }
        Err(errors) => {
            for e in errors {
                eprintln!("{e}");
            }
            std::process::exit(1);
        }
    }
}

fn view_state(
    search: Option<String>,
    priority: Option<Priority>,
    subject: Option<String>,
    sort: SortMode,
) -> ViewState {
    ViewState {
        search: search.unwrap_or_default(),
        priority,
        subject,
        sort,
    }
}

/// Print tasks in a formatted table with derived status per row.
fn print_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<10} {:<8} {:<10} {:<16} {}",
        "ID", "Status", "Pri", "Due", "Subject", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        println!(
            "{:<5} {:<10} {:<8} {:<10} {:<16} {}",
            t.id,
            format_derived_status(derive_status(t, today)),
            format_priority(t.priority),
            format_due_relative(t.due, today),
            truncate(&t.subject, 16),
            t.title,
        );
    }
}

/// List tasks through the view pipeline as a flat table.
pub fn cmd_list(
    store: &TaskStore,
    search: Option<String>,
    priority: Option<Priority>,
    subject: Option<String>,
    sort: SortMode,
) {
    let view = view_state(search, priority, subject, sort);
    let visible = apply_view(&store.tasks, &view);
    print_table(&visible);
    println!("{} task(s)", visible.len());
}

/// Render the three-bucket board as text.
pub fn cmd_board(
    store: &TaskStore,
    search: Option<String>,
    priority: Option<Priority>,
    subject: Option<String>,
    sort: SortMode,
) {
    let view = view_state(search, priority, subject, sort);
    let today = Local::now().date_naive();
    let board = build_board(&store.tasks, &view, today);

    for (name, bucket) in [
        ("Pending", &board.pending),
        ("Completed", &board.completed),
        ("Overdue", &board.overdue),
    ] {
        println!("== {} ({}) ==", name, bucket.len());
        print_table(bucket);
        println!();
    }
}

/// View detailed information about a specific task.
pub fn cmd_view(store: &TaskStore, id: u64) {
    let Some(task) = store.get(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };
    let today = Local::now().date_naive();
    println!("ID:          {}", task.id);
    println!("Title:       {}", task.title);
    println!("Subject:     {}", task.subject);
    println!("Priority:    {}", format_priority(task.priority));
    println!(
        "Status:      {}",
        format_derived_status(derive_status(task, today))
    );
    println!(
        "Due:         {}",
        match task.due {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    if let Some(ts) = Utc.timestamp_opt(task.created_at_utc, 0).single() {
        println!("Created UTC: {}", ts.to_rfc3339());
    }
    if let Some(ts) = Utc.timestamp_opt(task.updated_at_utc, 0).single() {
        println!("Updated UTC: {}", ts.to_rfc3339());
    }
    println!(
        "Description:\n{}",
        task.description.as_deref().unwrap_or("-")
    );
}

/// Update an existing task's fields, merging flags over current values.
pub fn cmd_update(
    store: &mut TaskStore,
    db_path: &Path,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    subject: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
) {
    let Some(existing) = store.get(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };
    let due = match due {
        Some(raw) => match parse_due_input(&raw) {
            Some(d) => Some(d),
            None => {
                eprintln!("Could not parse due date '{raw}'.");
                std::process::exit(1);
            }
        },
        None => existing.due,
    };
    let draft = TaskDraft {
        title: title.unwrap_or_else(|| existing.title.clone()),
        description: desc.or_else(|| existing.description.clone()),
        subject: subject.unwrap_or_else(|| existing.subject.clone()),
        priority: Some(priority.unwrap_or(existing.priority)),
        due,
    };
    match store.update(id, draft, Utc::now().timestamp()) {
        Ok(_) => {
            save_or_exit(store, db_path);
            println!("Updated task {id}");
        }
        Err(UpdateError::NotFound) => {
            eprintln!("Task {id} not found.");
            std::process::exit(1);
        }
        Err(UpdateError::Invalid(errors)) => {
            for e in errors {
                eprintln!("{e}");
            }
            std::process::exit(1);
        }
    }
}

/// Toggle a task's completion state.
pub fn cmd_done(store: &mut TaskStore, db_path: &Path, id: u64) {
    match store.toggle_completed(id, Utc::now().timestamp()) {
        Some(status) => {
            save_or_exit(store, db_path);
            let label = match status {
                StoredStatus::Pending => "pending",
                StoredStatus::Completed => "completed",
            };
            println!("Task {id} is now {label}");
        }
        None => println!("Task {id} not found; nothing to do."),
    }
}

/// Delete a task. Absence is a benign no-op, not an error.
pub fn cmd_delete(store: &mut TaskStore, db_path: &Path, id: u64) {
    if store.delete(id) {
        save_or_exit(store, db_path);
        println!("Deleted task {id}");
    } else {
        println!("Task {id} not found; nothing to do.");
    }
}

/// List distinct subjects with task counts.
pub fn cmd_subjects(store: &TaskStore) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &store.tasks {
        *counts.entry(t.subject.as_str()).or_default() += 1;
    }
    if counts.is_empty() {
        println!("No tasks.");
        return;
    }
    for subject in subjects(&store.tasks) {
        println!("{:<20} {}", subject, counts.get(subject.as_str()).copied().unwrap_or(0));
    }
}

/// Export all tasks to a JSON file.
pub fn cmd_export(store: &TaskStore, output: Option<String>) {
    let output = output.unwrap_or_else(|| "tasks_export.json".to_string());
    let data = match serde_json::to_string_pretty(&store.tasks) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to serialise tasks: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(&output, data) {
        eprintln!("Failed to write {output}: {e}");
        std::process::exit(1);
    }
    println!("Exported {} task(s) to {}", store.tasks.len(), output);
}

/// Import tasks from a JSON file, appending them with fresh ids so they
/// cannot collide with the existing collection.
pub fn cmd_import(store: &mut TaskStore, db_path: &Path, input: String) {
    let data = match std::fs::read_to_string(&input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to read {input}: {e}");
            std::process::exit(1);
        }
    };
    let imported: Vec<Task> = match serde_json::from_str(&data) {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("Failed to parse {input}: {e}");
            std::process::exit(1);
        }
    };
    let count = store.import(imported);
    save_or_exit(store, db_path);
    println!("Imported {count} task(s) from {input}");
}

/// Generate shell completion scripts on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
