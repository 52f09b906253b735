//! The task store: authoritative in-memory collection plus JSON persistence.
//!
//! This module provides the `TaskStore` struct holding the task collection,
//! the validation gate applied before any create/update, and utility
//! functions for date parsing and display formatting shared by the CLI and
//! the TUI.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fields::{DerivedStatus, Priority, StoredStatus};
use crate::task::{Task, TaskDraft};

/// Maximum accepted description length, in characters.
pub const DESCRIPTION_MAX: usize = 1000;

/// Why an update could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// No task with the given id exists.
    NotFound,
    /// The merged draft failed validation; messages are user-facing.
    Invalid(Vec<String>),
}

/// In-memory store for the task collection. Sole owner of persisted state:
/// every mutation goes through here and is followed by a full `save`.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the store from a JSON file.
    ///
    /// A missing file yields an empty store. An unreadable or unparsable
    /// file is reported on stderr and discarded in favour of an empty store;
    /// a corrupt database is recoverable, never fatal.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return TaskStore::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing task file, starting fresh: {e}");
                    TaskStore::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading task file, starting fresh: {e}");
                TaskStore::default()
            }
        }
    }

    /// Save the whole collection to a JSON file via temp file + rename.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available task id. Ids are never reused while the
    /// highest-numbered task is still present.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Validate a draft, collecting every problem rather than stopping at
    /// the first. An empty result means the draft is acceptable.
    pub fn validate(draft: &TaskDraft) -> Vec<String> {
        let mut errors = Vec::new();
        if draft.title.trim().is_empty() {
            errors.push("Title is required.".to_string());
        }
        if draft.subject.trim().is_empty() {
            errors.push("Subject is required.".to_string());
        }
        if draft.priority.is_none() {
            errors.push("Priority is required.".to_string());
        }
        if draft.due.is_none() {
            errors.push("Due date is required.".to_string());
        }
        if let Some(desc) = &draft.description {
            if desc.chars().count() > DESCRIPTION_MAX {
                errors.push(format!(
                    "Description is too long (max {DESCRIPTION_MAX} characters)."
                ));
            }
        }
        errors
    }

    /// Create a task from a draft. On validation failure the store is left
    /// untouched and the messages are returned for the caller to report.
    pub fn create(&mut self, draft: TaskDraft, now_utc: i64) -> Result<&Task, Vec<String>> {
        let errors = Self::validate(&draft);
        if !errors.is_empty() {
            return Err(errors);
        }
        let id = self.next_id();
        let task = Task {
            id,
            title: draft.title.trim().to_string(),
            description: draft
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            subject: draft.subject.trim().to_string(),
            priority: draft.priority.unwrap_or(Priority::Medium),
            due: draft.due,
            status: StoredStatus::Pending,
            created_at_utc: now_utc,
            updated_at_utc: now_utc,
        };
        let idx = self.tasks.len();
        self.tasks.push(task);
        Ok(&self.tasks[idx])
    }

    /// Replace the mutable fields of an existing task with a validated
    /// draft, preserving id, stored status and creation time.
    pub fn update(
        &mut self,
        id: u64,
        draft: TaskDraft,
        now_utc: i64,
    ) -> Result<&Task, UpdateError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(UpdateError::NotFound)?;
        let errors = Self::validate(&draft);
        if !errors.is_empty() {
            return Err(UpdateError::Invalid(errors));
        }
        let task = &mut self.tasks[idx];
        task.title = draft.title.trim().to_string();
        task.description = draft
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        task.subject = draft.subject.trim().to_string();
        task.priority = draft.priority.unwrap_or(task.priority);
        task.due = draft.due;
        task.updated_at_utc = now_utc;
        Ok(&self.tasks[idx])
    }

    /// Append externally sourced tasks, re-minting each id so imports can
    /// never collide with the existing collection. Returns the count added.
    pub fn import(&mut self, tasks: Vec<Task>) -> usize {
        let count = tasks.len();
        for mut task in tasks {
            task.id = self.next_id();
            self.tasks.push(task);
        }
        count
    }

    /// Remove the task with the given id. Returns whether anything was
    /// removed; deleting an absent id is a benign no-op.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Flip a task between pending and completed. Returns the new stored
    /// status, or `None` if the id is absent.
    pub fn toggle_completed(&mut self, id: u64, now_utc: i64) -> Option<StoredStatus> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = match task.status {
            StoredStatus::Pending => StoredStatus::Completed,
            StoredStatus::Completed => StoredStatus::Pending,
        };
        task.updated_at_utc = now_utc;
        Some(task.status)
    }
}

/// Parse human-readable due date input.
///
/// Supports "today", "tomorrow", "in 3d", "in 2w" and the YYYY-MM-DD format.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

/// Format a derived status for display.
pub fn format_derived_status(s: DerivedStatus) -> &'static str {
    match s {
        DerivedStatus::Pending => "Pending",
        DerivedStatus::Completed => "Completed",
        DerivedStatus::Overdue => "Overdue",
    }
}

/// Format a due date as dd/mm/yy for compact card display.
pub fn format_due_short(due: Option<NaiveDate>) -> String {
    match due {
        None => "-".into(),
        Some(d) => d.format("%d/%m/%y").to_string(),
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = d - today;
            if delta.num_days() == 0 {
                "today".into()
            } else if delta.num_days() == 1 {
                "tomorrow".into()
            } else if delta.num_days() > 1 {
                format!("in {}d", delta.num_days())
            } else {
                format!("{}d late", -delta.num_days())
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, subject: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: None,
            subject: subject.to_string(),
            priority: Some(Priority::Medium),
            due: NaiveDate::from_ymd_opt(2025, 6, 1),
        }
    }

    #[test]
    fn test_create_mints_sequential_ids() {
        let mut store = TaskStore::default();
        let a = store.create(draft("A", "Math"), 0).unwrap().id;
        let b = store.create(draft("B", "Math"), 0).unwrap().id;
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        store.delete(a);
        // Highest id still present, so 2 is not reused.
        let c = store.create(draft("C", "Math"), 0).unwrap().id;
        assert_eq!(c, 3);
    }

    #[test]
    fn test_create_rejects_empty_title_without_mutation() {
        let mut store = TaskStore::default();
        let mut d = draft("", "Math");
        d.title = "   ".to_string();
        let errors = store.create(d, 0).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Title")));
        assert_eq!(store.tasks.len(), 0);
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let d = TaskDraft {
            title: String::new(),
            description: Some("x".repeat(DESCRIPTION_MAX + 1)),
            subject: String::new(),
            priority: None,
            due: None,
        };
        let errors = TaskStore::validate(&d);
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_description_at_cap_is_accepted() {
        let mut d = draft("A", "Math");
        d.description = Some("x".repeat(DESCRIPTION_MAX));
        assert!(TaskStore::validate(&d).is_empty());
    }

    #[test]
    fn test_update_not_found() {
        let mut store = TaskStore::default();
        let err = store.update(42, draft("A", "Math"), 0).unwrap_err();
        assert_eq!(err, UpdateError::NotFound);
    }

    #[test]
    fn test_update_preserves_id_and_created_at() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", "Math"), 100).unwrap().id;
        let updated = store.update(id, draft("A2", "Physics"), 200).unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at_utc, 100);
        assert_eq!(updated.updated_at_utc, 200);
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.subject, "Physics");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", "Math"), 0).unwrap().id;
        assert!(store.delete(id));
        assert!(!store.delete(id));
        assert_eq!(store.tasks.len(), 0);
    }

    #[test]
    fn test_toggle_completed_flips_both_ways() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", "Math"), 0).unwrap().id;
        assert_eq!(store.toggle_completed(id, 1), Some(StoredStatus::Completed));
        assert_eq!(store.toggle_completed(id, 2), Some(StoredStatus::Pending));
        assert_eq!(store.toggle_completed(999, 3), None);
    }

    #[test]
    fn test_import_remints_colliding_ids() {
        let mut store = TaskStore::default();
        store.create(draft("A", "Math"), 0).unwrap();
        // Incoming record reuses an id already present in the store.
        let mut incoming = store.tasks[0].clone();
        incoming.id = 1;
        incoming.title = "B".to_string();
        let count = store.import(vec![incoming]);
        assert_eq!(count, 1);
        assert_eq!(store.tasks.len(), 2);
        let mut ids: Vec<u64> = store.tasks.iter().map(|t| t.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_serde_round_trip_preserves_order_and_values() {
        let mut store = TaskStore::default();
        store.create(draft("B", "Math"), 0).unwrap();
        store.create(draft("A", "Physics"), 0).unwrap();
        let json = serde_json::to_string_pretty(&store).unwrap();
        let back: TaskStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_legacy_values_normalise_on_load() {
        // Database written by the original web version: Spanish labels,
        // camelCase date key, stored board-column statuses.
        let json = r#"{ "tasks": [
            { "id": 1, "title": "A", "materia": "Math", "priority": "alta",
              "deliveryDate": "2025-03-05", "status": "retrasada" },
            { "id": 2, "title": "B", "materia": "Math", "priority": "baja",
              "deliveryDate": "2024-01-01", "status": "completada" },
            { "id": 3, "title": "C", "materia": "UX Design", "priority": "media",
              "status": "in-progress" }
        ]}"#;
        let store: TaskStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.tasks[0].priority, Priority::High);
        assert_eq!(store.tasks[0].status, StoredStatus::Pending);
        assert_eq!(
            store.tasks[0].due,
            NaiveDate::from_ymd_opt(2025, 3, 5)
        );
        assert_eq!(store.tasks[1].status, StoredStatus::Completed);
        assert_eq!(store.tasks[2].status, StoredStatus::Pending);
        assert_eq!(store.tasks[2].due, None);
    }

    #[test]
    fn test_load_recovers_from_corrupt_file() {
        let path = std::env::temp_dir().join("tasky_corrupt_test.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = TaskStore::load(&path);
        assert_eq!(store.tasks.len(), 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_load_file_round_trip() {
        let path = std::env::temp_dir().join("tasky_roundtrip_test.json");
        let mut store = TaskStore::default();
        store.create(draft("A", "Math"), 7).unwrap();
        store.save(&path).unwrap();
        let back = TaskStore::load(&path);
        assert_eq!(back, store);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_due_input_iso() {
        assert_eq!(
            parse_due_input("2025-03-05"),
            NaiveDate::from_ymd_opt(2025, 3, 5)
        );
        assert_eq!(parse_due_input("not a date"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer string", 8), "a longe…");
    }
}
