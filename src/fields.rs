//! Enumerations and field types for the task tracker.
//!
//! This module defines the structured value types used on tasks: priority,
//! stored completion status, the derived display status, and the sort modes
//! accepted by the view pipeline. Stored enums carry serde aliases for the
//! legacy values found in databases written by earlier versions of the app
//! (Spanish labels, and statuses that conflated board column with state).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task priority. Total order: High > Medium > Low.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[serde(alias = "alta")]
    High,
    #[serde(alias = "media")]
    Medium,
    #[serde(alias = "baja")]
    Low,
}

impl Priority {
    /// Rank for sorting: 0 is most urgent. Ties keep input order.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Persisted completion state.
///
/// Only two values are ever stored. Legacy databases persisted board columns
/// as statuses (`in-progress`, `overdue`, `retrasada`); those all normalise
/// to `Pending` on load, since overdue is derived from the due date at
/// render time and must never disagree with it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StoredStatus {
    #[serde(alias = "pendiente", alias = "in-progress", alias = "overdue", alias = "retrasada")]
    Pending,
    #[serde(alias = "completada")]
    Completed,
}

/// Display status computed from stored status and due date. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedStatus {
    Pending,
    Completed,
    Overdue,
}

/// Sort modes for the task list view.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortMode {
    /// Keep the collection's current order.
    None,
    /// Due date ascending; undated tasks last.
    DateAsc,
    /// Due date descending; undated tasks still last.
    DateDesc,
    /// Priority descending (high, medium, low).
    Priority,
}

impl SortMode {
    /// Next mode in the UI sort-button cycle.
    pub fn cycle(self) -> SortMode {
        match self {
            SortMode::None => SortMode::DateAsc,
            SortMode::DateAsc => SortMode::DateDesc,
            SortMode::DateDesc => SortMode::Priority,
            SortMode::Priority => SortMode::None,
        }
    }
}
