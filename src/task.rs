//! Task data structure and the draft record used for create/update.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{Priority, StoredStatus};

/// A single academic task: title, subject, priority, due date, description
/// and completion state.
///
/// `id` is minted at creation and immutable thereafter. Presentation order
/// is never stored on the task; it is always derived by the view pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "materia")]
    pub subject: String,
    pub priority: Priority,
    #[serde(default, alias = "delivery_date", alias = "deliveryDate")]
    pub due: Option<NaiveDate>,
    pub status: StoredStatus,
    #[serde(default)]
    pub created_at_utc: i64,
    #[serde(default)]
    pub updated_at_utc: i64,
}

/// User-entered fields for creating or editing a task, prior to validation.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub priority: Option<Priority>,
    pub due: Option<NaiveDate>,
}
