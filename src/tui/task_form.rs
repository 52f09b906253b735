//! Create/edit form state for the board UI.
//!
//! The form collects a `TaskDraft`; validation happens in the store when the
//! form is submitted, and any messages come back here for display while the
//! entered values are retained for correction.

use crate::fields::Priority;
use crate::store::parse_due_input;
use crate::task::{Task, TaskDraft};
use crate::tui::input::InputField;

/// Form fields in navigation order.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Subject,
    Priority,
    Due,
    Description,
}

pub const FIELD_ORDER: [FormField; 5] = [
    FormField::Title,
    FormField::Subject,
    FormField::Priority,
    FormField::Due,
    FormField::Description,
];

/// State for the task create/edit form.
pub struct TaskForm {
    pub title: InputField,
    pub subject: InputField,
    pub priority: Option<Priority>,
    pub due: InputField,
    pub description: InputField,
    pub active: usize,
    /// Id of the task being edited, or `None` when creating.
    pub editing: Option<u64>,
    /// Validation messages from the last rejected submit.
    pub errors: Vec<String>,
}

impl TaskForm {
    /// Empty form for creating a new task.
    pub fn new() -> Self {
        TaskForm {
            title: InputField::new(),
            subject: InputField::new(),
            priority: None,
            due: InputField::new(),
            description: InputField::new(),
            active: 0,
            editing: None,
            errors: Vec::new(),
        }
    }

    /// Form preloaded with an existing task's fields.
    pub fn from_task(task: &Task) -> Self {
        TaskForm {
            title: InputField::with_value(&task.title),
            subject: InputField::with_value(&task.subject),
            priority: Some(task.priority),
            due: InputField::with_value(
                &task.due.map(|d| d.to_string()).unwrap_or_default(),
            ),
            description: InputField::with_value(task.description.as_deref().unwrap_or("")),
            active: 0,
            editing: Some(task.id),
            errors: Vec::new(),
        }
    }

    pub fn active_field(&self) -> FormField {
        FIELD_ORDER[self.active]
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % FIELD_ORDER.len();
    }

    pub fn prev_field(&mut self) {
        self.active = (self.active + FIELD_ORDER.len() - 1) % FIELD_ORDER.len();
    }

    /// Cycle the priority selector, forwards or backwards through
    /// high / medium / low.
    pub fn cycle_priority(&mut self, forward: bool) {
        let order = [Priority::High, Priority::Medium, Priority::Low];
        self.priority = Some(match (self.priority, forward) {
            (None, _) => Priority::High,
            (Some(p), true) => {
                let i = order.iter().position(|&x| x == p).unwrap_or(0);
                order[(i + 1) % order.len()]
            }
            (Some(p), false) => {
                let i = order.iter().position(|&x| x == p).unwrap_or(0);
                order[(i + order.len() - 1) % order.len()]
            }
        });
    }

    /// Mutable input field under the cursor, if the active field is textual.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.active_field() {
            FormField::Title => Some(&mut self.title),
            FormField::Subject => Some(&mut self.subject),
            FormField::Due => Some(&mut self.due),
            FormField::Description => Some(&mut self.description),
            FormField::Priority => None,
        }
    }

    /// Assemble the draft for submission. Due text that fails to parse is
    /// passed through as `None` so the store reports it as missing.
    pub fn to_draft(&self) -> TaskDraft {
        let description = self.description.value.trim();
        TaskDraft {
            title: self.title.value.clone(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            subject: self.subject.value.clone(),
            priority: self.priority,
            due: parse_due_input(&self.due.value),
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
