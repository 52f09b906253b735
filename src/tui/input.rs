//! Input field handling for the terminal user interface.

/// A single-line text input with cursor position tracking.
#[derive(Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    /// Create an empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    /// Insert a character at the cursor.
    pub fn handle_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.value[..self.cursor]
                .chars()
                .next_back()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            self.cursor -= prev;
            self.value.remove(self.cursor);
        }
    }

    /// Move the cursor one character left.
    pub fn move_left(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    /// Move the cursor one character right.
    pub fn move_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Clear text and reset the cursor.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}
