//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Board column accents match the derived status of their contents.

/// Used for the pending column.
pub const PENDING_BLUE: Color = Color::Rgb(70, 130, 180);
/// Used for the completed column.
pub const COMPLETED_GREEN: Color = Color::Rgb(0, 120, 0);
/// Used for the overdue column.
pub const OVERDUE_RED: Color = Color::Rgb(178, 34, 34);
/// Used for high-priority tags.
pub const HIGH_AMBER: Color = Color::Rgb(255, 140, 0);
