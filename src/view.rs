//! The view-model pipeline: search, filter, sort and board grouping.
//!
//! Everything in this module is a pure projection over the task collection
//! and the transient view state. Nothing here mutates the store, touches the
//! terminal or reads the clock; `today` is always caller-supplied so the
//! pipeline stays deterministic and unit-testable.

use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::fields::{DerivedStatus, Priority, SortMode, StoredStatus};
use crate::task::Task;

/// Transient user selections governing what subset and order of tasks is
/// shown. Never persisted; `None` on a filter means "all".
#[derive(Debug, Clone)]
pub struct ViewState {
    pub search: String,
    pub priority: Option<Priority>,
    pub subject: Option<String>,
    pub sort: SortMode,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            search: String::new(),
            priority: None,
            subject: None,
            sort: SortMode::None,
        }
    }
}

/// The three-column board produced for the kanban-style display. Buckets are
/// mutually exclusive; their union is exactly the filtered sequence, in
/// sorted order within each bucket.
#[derive(Debug, Default)]
pub struct Board<'a> {
    pub pending: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
    pub overdue: Vec<&'a Task>,
}

impl<'a> Board<'a> {
    /// Bucket for a derived status, in board column order.
    pub fn bucket(&self, status: DerivedStatus) -> &[&'a Task] {
        match status {
            DerivedStatus::Pending => &self.pending,
            DerivedStatus::Completed => &self.completed,
            DerivedStatus::Overdue => &self.overdue,
        }
    }

    /// Per-bucket counts in (pending, completed, overdue) order.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.pending.len(), self.completed.len(), self.overdue.len())
    }
}

/// Compute the display status for a task.
///
/// Completion is sticky: a completed task is never shown overdue, whatever
/// its due date. Otherwise a due date strictly before `today` means overdue;
/// an undated task is never overdue.
pub fn derive_status(task: &Task, today: NaiveDate) -> DerivedStatus {
    if task.status == StoredStatus::Completed {
        return DerivedStatus::Completed;
    }
    match task.due {
        Some(due) if due < today => DerivedStatus::Overdue,
        _ => DerivedStatus::Pending,
    }
}

/// True when the case-insensitive search term occurs in the task's title,
/// description or subject. An absent description counts as empty.
fn matches_search(task: &Task, term: &str) -> bool {
    let q = term.to_lowercase();
    task.title.to_lowercase().contains(&q)
        || task
            .description
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains(&q)
        || task.subject.to_lowercase().contains(&q)
}

/// Apply search, filters and sort, in that fixed order.
///
/// Search and filters narrow without reordering; the sort stage is stable,
/// so ties and undated tasks keep their relative input order. Undated tasks
/// sort after all dated ones in both date directions.
pub fn apply_view<'a>(tasks: &'a [Task], view: &ViewState) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| view.search.trim().is_empty() || matches_search(t, view.search.trim()))
        .filter(|t| view.priority.map_or(true, |p| t.priority == p))
        .filter(|t| view.subject.as_deref().map_or(true, |s| t.subject == s))
        .collect();

    match view.sort {
        SortMode::None => {}
        SortMode::DateAsc => {
            visible.sort_by_key(|t| t.due.unwrap_or(NaiveDate::MAX));
        }
        SortMode::DateDesc => {
            visible.sort_by_key(|t| (t.due.is_none(), Reverse(t.due.unwrap_or(NaiveDate::MIN))));
        }
        SortMode::Priority => {
            visible.sort_by_key(|t| t.priority.rank());
        }
    }
    visible
}

/// Run the full pipeline and partition the result into the three display
/// buckets by derived status.
pub fn build_board<'a>(tasks: &'a [Task], view: &ViewState, today: NaiveDate) -> Board<'a> {
    let mut board = Board::default();
    for task in apply_view(tasks, view) {
        match derive_status(task, today) {
            DerivedStatus::Pending => board.pending.push(task),
            DerivedStatus::Completed => board.completed.push(task),
            DerivedStatus::Overdue => board.overdue.push(task),
        }
    }
    board
}

/// Distinct subject labels, sorted, for the dynamic subject filter.
pub fn subjects(tasks: &[Task]) -> Vec<String> {
    let mut out: Vec<String> = tasks.iter().map(|t| t.subject.clone()).collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, title: &str, subject: &str, priority: Priority, due: Option<&str>) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            subject: subject.to_string(),
            priority,
            due: due.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            status: StoredStatus::Pending,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_completed_is_sticky_over_due_date() {
        let mut t = task(1, "A", "Math", Priority::High, Some("2025-01-01"));
        t.status = StoredStatus::Completed;
        assert_eq!(derive_status(&t, today()), DerivedStatus::Completed);
    }

    #[test]
    fn test_pending_before_today_is_overdue() {
        let t = task(1, "A", "Math", Priority::High, Some("2025-01-01"));
        assert_eq!(derive_status(&t, today()), DerivedStatus::Overdue);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let t = task(1, "A", "Math", Priority::High, Some("2025-06-01"));
        assert_eq!(derive_status(&t, today()), DerivedStatus::Pending);
    }

    #[test]
    fn test_undated_task_is_never_overdue() {
        let t = task(1, "A", "Math", Priority::High, None);
        assert_eq!(derive_status(&t, today()), DerivedStatus::Pending);
    }

    #[test]
    fn test_search_matches_title_description_and_subject() {
        let mut a = task(1, "Essay draft", "History", Priority::Low, None);
        a.description = Some("Cover the French Revolution".to_string());
        let b = task(2, "Lab report", "Chemistry", Priority::Low, None);
        let tasks = vec![a, b];

        let mut view = ViewState {
            search: "REVOLUTION".to_string(),
            ..ViewState::default()
        };
        assert_eq!(ids(&apply_view(&tasks, &view)), vec![1]);

        view.search = "chem".to_string();
        assert_eq!(ids(&apply_view(&tasks, &view)), vec![2]);

        // Empty search keeps everything.
        view.search = String::new();
        assert_eq!(ids(&apply_view(&tasks, &view)), vec![1, 2]);
    }

    #[test]
    fn test_priority_filter_narrows_without_reordering() {
        let tasks = vec![
            task(1, "A", "Math", Priority::High, None),
            task(2, "B", "Math", Priority::Low, None),
            task(3, "C", "Math", Priority::High, None),
            task(4, "D", "Math", Priority::Medium, None),
        ];
        let view = ViewState {
            priority: Some(Priority::High),
            ..ViewState::default()
        };
        let visible = apply_view(&tasks, &view);
        assert_eq!(ids(&visible), vec![1, 3]);
        assert!(visible.iter().all(|t| t.priority == Priority::High));
    }

    #[test]
    fn test_subject_filter_is_exact() {
        let tasks = vec![
            task(1, "A", "Math", Priority::High, None),
            task(2, "B", "Mathematics", Priority::High, None),
        ];
        let view = ViewState {
            subject: Some("Math".to_string()),
            ..ViewState::default()
        };
        assert_eq!(ids(&apply_view(&tasks, &view)), vec![1]);
    }

    #[test]
    fn test_date_sort_puts_undated_last_in_both_directions() {
        let tasks = vec![
            task(1, "A", "Math", Priority::High, Some("2025-01-10")),
            task(2, "B", "Math", Priority::High, None),
            task(3, "C", "Math", Priority::High, Some("2025-01-05")),
        ];
        let asc = ViewState {
            sort: SortMode::DateAsc,
            ..ViewState::default()
        };
        assert_eq!(ids(&apply_view(&tasks, &asc)), vec![3, 1, 2]);

        let desc = ViewState {
            sort: SortMode::DateDesc,
            ..ViewState::default()
        };
        assert_eq!(ids(&apply_view(&tasks, &desc)), vec![1, 3, 2]);
    }

    #[test]
    fn test_date_sort_is_stable_for_equal_dates_and_undated() {
        let tasks = vec![
            task(1, "A", "Math", Priority::High, None),
            task(2, "B", "Math", Priority::High, Some("2025-01-05")),
            task(3, "C", "Math", Priority::High, None),
            task(4, "D", "Math", Priority::High, Some("2025-01-05")),
        ];
        let view = ViewState {
            sort: SortMode::DateAsc,
            ..ViewState::default()
        };
        assert_eq!(ids(&apply_view(&tasks, &view)), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_priority_sort_high_first_ties_stable() {
        let tasks = vec![
            task(1, "A", "Math", Priority::Low, None),
            task(2, "B", "Math", Priority::High, None),
            task(3, "C", "Math", Priority::Low, None),
            task(4, "D", "Math", Priority::Medium, None),
        ];
        let view = ViewState {
            sort: SortMode::Priority,
            ..ViewState::default()
        };
        assert_eq!(ids(&apply_view(&tasks, &view)), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_board_is_a_partition_of_the_filtered_set() {
        let mut done = task(3, "C", "Math", Priority::Low, Some("2025-01-01"));
        done.status = StoredStatus::Completed;
        let tasks = vec![
            task(1, "A", "Math", Priority::High, Some("2025-01-10")),
            task(2, "B", "Math", Priority::Low, Some("2025-12-01")),
            done,
            task(4, "D", "Math", Priority::Medium, None),
        ];
        let view = ViewState::default();
        let board = build_board(&tasks, &view, today());

        let mut all = ids(&board.pending);
        all.extend(ids(&board.completed));
        all.extend(ids(&board.overdue));
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4]);
        assert_eq!(board.counts(), (2, 1, 1));
    }

    #[test]
    fn test_empty_collection_yields_empty_board() {
        let board = build_board(&[], &ViewState::default(), today());
        assert_eq!(board.counts(), (0, 0, 0));
    }

    #[test]
    fn test_legacy_seed_scenario() {
        // Two legacy-valued tasks, both past due, priority sort: the high
        // priority one leads and both land in the overdue bucket.
        let json = r#"{ "tasks": [
            { "id": 1, "title": "A", "materia": "Math", "priority": "alta",
              "deliveryDate": "2025-03-05", "status": "pendiente" },
            { "id": 2, "title": "B", "materia": "Math", "priority": "baja",
              "deliveryDate": "2024-01-01", "status": "pendiente" }
        ]}"#;
        let store: crate::store::TaskStore = serde_json::from_str(json).unwrap();
        let view = ViewState {
            sort: SortMode::Priority,
            ..ViewState::default()
        };
        let board = build_board(&store.tasks, &view, today());
        assert_eq!(ids(&board.overdue), vec![1, 2]);
        assert_eq!(board.counts(), (0, 0, 2));
    }

    #[test]
    fn test_subjects_sorted_and_deduplicated() {
        let tasks = vec![
            task(1, "A", "Physics", Priority::High, None),
            task(2, "B", "Math", Priority::High, None),
            task(3, "C", "Physics", Priority::High, None),
        ];
        assert_eq!(subjects(&tasks), vec!["Math", "Physics"]);
    }
}
