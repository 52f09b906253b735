//! Board application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the store and the view
//! state, handles user input, and renders the three-column board. All
//! ordering and grouping comes from the view pipeline; drawing code only
//! paints what `build_board` returns.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::fields::{DerivedStatus, Priority, SortMode};
use crate::store::{format_due_short, format_priority, truncate, TaskStore, UpdateError};
use crate::task::Task;
use crate::tui::colors::{COMPLETED_GREEN, HIGH_AMBER, OVERDUE_RED, PENDING_BLUE};
use crate::tui::input::InputField;
use crate::tui::task_form::{FormField, TaskForm, FIELD_ORDER};
use crate::tui::utils::centered_rect;
use crate::view::{build_board, subjects, Board, ViewState};

/// Which screen currently owns the keyboard.
#[derive(Clone, Copy, PartialEq, Eq)]
enum AppState {
    Board,
    Search,
    Form,
    ConfirmDelete,
}

const COLUMNS: [DerivedStatus; 3] = [
    DerivedStatus::Pending,
    DerivedStatus::Completed,
    DerivedStatus::Overdue,
];

/// Main application state for the board UI.
pub struct App {
    store: TaskStore,
    db_path: PathBuf,
    view: ViewState,
    state: AppState,
    column: usize,
    selected: [usize; 3],
    search: InputField,
    form: TaskForm,
    confirm_delete: Option<u64>,
    status_message: String,
    pub should_quit: bool,
}

impl App {
    /// Create the app, loading the store from the given path.
    pub fn new(db_path: &Path) -> Self {
        App {
            store: TaskStore::load(db_path),
            db_path: db_path.to_path_buf(),
            view: ViewState::default(),
            state: AppState::Board,
            column: 0,
            selected: [0; 3],
            search: InputField::new(),
            form: TaskForm::new(),
            confirm_delete: None,
            status_message: String::new(),
            should_quit: false,
        }
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn board(&self) -> Board<'_> {
        build_board(&self.store.tasks, &self.view, self.today())
    }

    /// Id of the task under the cursor, if the current column is non-empty.
    fn selected_task_id(&self) -> Option<u64> {
        let board = self.board();
        let bucket = board.bucket(COLUMNS[self.column]);
        if bucket.is_empty() {
            return None;
        }
        let idx = self.selected[self.column].min(bucket.len() - 1);
        Some(bucket[idx].id)
    }

    /// Write the collection out. A failed save keeps the in-memory state and
    /// is reported in the status line rather than ending the session.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.db_path) {
            self.status_message = format!("Save failed: {e}");
        }
    }

    fn clamp_selection(&mut self) {
        let lens = {
            let board = self.board();
            let (p, c, o) = board.counts();
            [p, c, o]
        };
        for (i, len) in lens.into_iter().enumerate() {
            if self.selected[i] >= len {
                self.selected[i] = len.saturating_sub(1);
            }
        }
    }

    /// Cycle the priority filter: all -> high -> medium -> low -> all.
    fn cycle_priority_filter(&mut self) {
        self.view.priority = match self.view.priority {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        };
    }

    /// Cycle the subject filter through the subjects present in the store.
    fn cycle_subject_filter(&mut self) {
        let all = subjects(&self.store.tasks);
        if all.is_empty() {
            self.view.subject = None;
            return;
        }
        self.view.subject = match &self.view.subject {
            None => Some(all[0].clone()),
            Some(current) => match all.iter().position(|s| s == current) {
                Some(i) if i + 1 < all.len() => Some(all[i + 1].clone()),
                _ => None,
            },
        };
    }

    /// Handle a key press for whichever screen is active.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.state {
            AppState::Board => self.handle_board_key(key),
            AppState::Search => self.handle_search_key(key),
            AppState::Form => self.handle_form_key(key),
            AppState::ConfirmDelete => self.handle_confirm_key(key),
        }
        self.clamp_selection();
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => {
                self.state = AppState::Search;
                self.status_message.clear();
            }
            KeyCode::Char('p') => self.cycle_priority_filter(),
            KeyCode::Char('u') => self.cycle_subject_filter(),
            KeyCode::Char('s') => self.view.sort = self.view.sort.cycle(),
            KeyCode::Char('x') => {
                self.view = ViewState::default();
                self.search.clear();
                self.status_message.clear();
            }
            KeyCode::Left => self.column = self.column.saturating_sub(1),
            KeyCode::Right => self.column = (self.column + 1).min(COLUMNS.len() - 1),
            KeyCode::Up => {
                self.selected[self.column] = self.selected[self.column].saturating_sub(1)
            }
            KeyCode::Down => self.selected[self.column] += 1,
            KeyCode::Char('a') => {
                self.form = TaskForm::new();
                self.state = AppState::Form;
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_task_id() {
                    if let Some(task) = self.store.get(id) {
                        self.form = TaskForm::from_task(task);
                        self.state = AppState::Form;
                    }
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_task_id() {
                    if self.store.toggle_completed(id, Utc::now().timestamp()).is_some() {
                        self.persist();
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task_id() {
                    self.confirm_delete = Some(id);
                    self.state = AppState::ConfirmDelete;
                }
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.state = AppState::Board,
            KeyCode::Backspace => {
                self.search.handle_backspace();
                self.view.search = self.search.value.clone();
            }
            KeyCode::Left => self.search.move_left(),
            KeyCode::Right => self.search.move_right(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.handle_char(c);
                self.view.search = self.search.value.clone();
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Board;
                self.form.errors.clear();
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Left => {
                if self.form.active_field() == FormField::Priority {
                    self.form.cycle_priority(false);
                } else if let Some(input) = self.form.active_input() {
                    input.move_left();
                }
            }
            KeyCode::Right => {
                if self.form.active_field() == FormField::Priority {
                    self.form.cycle_priority(true);
                } else if let Some(input) = self.form.active_input() {
                    input.move_right();
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.form.active_input() {
                    input.handle_backspace();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(input) = self.form.active_input() {
                    input.handle_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_delete.take() {
                    if self.store.delete(id) {
                        self.persist();
                        self.status_message = format!("Deleted task {id}");
                    }
                }
                self.state = AppState::Board;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = AppState::Board;
            }
            _ => {}
        }
    }

    /// Submit the form as a create or update. On validation failure the form
    /// stays open with its messages and the entered values intact.
    fn submit_form(&mut self) {
        let draft = self.form.to_draft();
        let now = Utc::now().timestamp();
        let result = match self.form.editing {
            None => self.store.create(draft, now).map(|t| t.id),
            Some(id) => self.store.update(id, draft, now).map(|t| t.id).map_err(|e| match e {
                UpdateError::NotFound => vec!["Task no longer exists.".to_string()],
                UpdateError::Invalid(errors) => errors,
            }),
        };
        match result {
            Ok(id) => {
                self.persist();
                self.status_message = match self.form.editing {
                    None => format!("Added task {id}"),
                    Some(_) => format!("Updated task {id}"),
                };
                self.state = AppState::Board;
                self.form.errors.clear();
            }
            Err(errors) => self.form.errors = errors,
        }
    }

    /// Render the whole UI for one frame.
    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.draw_header(f, chunks[0]);
        self.draw_board(f, chunks[1]);
        self.draw_footer(f, chunks[2]);

        match self.state {
            AppState::Form => self.draw_form(f),
            AppState::ConfirmDelete => self.draw_confirm(f),
            _ => {}
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let priority = match self.view.priority {
            None => "all".to_string(),
            Some(p) => format_priority(p).to_lowercase(),
        };
        let subject = self.view.subject.as_deref().unwrap_or("all");
        let sort = match self.view.sort {
            SortMode::None => "none",
            SortMode::DateAsc => "date-asc",
            SortMode::DateDesc => "date-desc",
            SortMode::Priority => "priority",
        };
        let search_style = if self.state == AppState::Search {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::raw(" search: "),
            Span::styled(
                if self.search.value.is_empty() && self.state != AppState::Search {
                    "-".to_string()
                } else {
                    self.search.value.clone()
                },
                search_style,
            ),
            Span::raw(format!(
                "   priority: {priority}   subject: {subject}   sort: {sort}"
            )),
        ]);
        let header = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tasky "),
        );
        f.render_widget(header, area);
    }

    fn draw_board(&self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        let board = self.board();
        let titles = ["Pending", "Completed", "Overdue"];
        let accents = [PENDING_BLUE, COMPLETED_GREEN, OVERDUE_RED];

        for (i, &status) in COLUMNS.iter().enumerate() {
            let bucket = board.bucket(status);
            let items: Vec<ListItem> = bucket
                .iter()
                .enumerate()
                .map(|(row, task)| self.task_item(task, i, row))
                .collect();
            let title = format!(" {} ({}) ", titles[i], bucket.len());
            let border_style = if i == self.column && self.state == AppState::Board {
                Style::default().fg(accents[i]).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(accents[i])
            };
            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            );
            f.render_widget(list, columns[i]);
        }
    }

    fn task_item(&self, task: &Task, column: usize, row: usize) -> ListItem<'static> {
        let selected =
            column == self.column && row == self.selected[self.column] && self.state == AppState::Board;
        let priority_style = match task.priority {
            Priority::High => Style::default().fg(HIGH_AMBER),
            Priority::Medium => Style::default().fg(Color::Yellow),
            Priority::Low => Style::default().fg(Color::Gray),
        };
        let mut line = vec![
            Span::styled(
                format!("[{}] ", format_priority(task.priority)),
                priority_style,
            ),
            Span::raw(truncate(&task.title, 28)),
            Span::raw(format!("  {} · {}", format_due_short(task.due), truncate(&task.subject, 14))),
        ];
        if selected {
            line.insert(0, Span::raw("> "));
            ListItem::new(Line::from(line))
                .style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            line.insert(0, Span::raw("  "));
            ListItem::new(Line::from(line))
        }
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let text = if self.status_message.is_empty() {
            " a add  e edit  space toggle  d delete  / search  p/u filter  s sort  x clear  q quit"
                .to_string()
        } else {
            format!(" {}", self.status_message)
        };
        f.render_widget(Paragraph::new(text), area);
    }

    fn draw_form(&self, f: &mut Frame) {
        let area = centered_rect(60, 70, f.area());
        f.render_widget(Clear, area);

        let title = match self.form.editing {
            None => " New task ",
            Some(_) => " Edit task ",
        };
        let mut lines: Vec<Line> = Vec::new();
        for (i, field) in FIELD_ORDER.iter().enumerate() {
            let (label, value) = match field {
                FormField::Title => ("Title", self.form.title.value.clone()),
                FormField::Subject => ("Subject", self.form.subject.value.clone()),
                FormField::Priority => (
                    "Priority",
                    match self.form.priority {
                        None => "< choose >".to_string(),
                        Some(p) => format!("< {} >", format_priority(p)),
                    },
                ),
                FormField::Due => ("Due", self.form.due.value.clone()),
                FormField::Description => ("Description", self.form.description.value.clone()),
            };
            let style = if i == self.form.active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{label:<12} {value}"),
                style,
            )));
        }
        lines.push(Line::raw(""));
        for error in &self.form.errors {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::raw(""));
        lines.push(Line::raw("tab/↑↓ move · ←→ edit/cycle · enter save · esc cancel"));

        let form = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(form, area);
    }

    fn draw_confirm(&self, f: &mut Frame) {
        let area = centered_rect(44, 20, f.area());
        f.render_widget(Clear, area);
        let id = self.confirm_delete.unwrap_or(0);
        let text = vec![
            Line::raw(""),
            Line::from(Span::raw(format!("Delete task {id}? This cannot be undone."))),
            Line::raw(""),
            Line::from(Span::raw("y / enter confirm · n / esc cancel")),
        ];
        let dialog = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Confirm "));
        f.render_widget(dialog, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;

    fn app_with_tasks(titles: &[&str]) -> App {
        let mut app = App::new(Path::new("nonexistent_board_test.json"));
        for title in titles {
            let draft = TaskDraft {
                title: title.to_string(),
                description: None,
                subject: "Math".to_string(),
                priority: Some(Priority::Medium),
                due: NaiveDate::from_ymd_opt(2099, 1, 1),
            };
            app.store.create(draft, 0).unwrap();
        }
        app
    }

    #[test]
    fn test_clamp_selection_follows_bucket_lengths() {
        let mut app = app_with_tasks(&["A", "B"]);
        app.selected = [10, 10, 10];
        app.clamp_selection();
        // Two pending tasks, nothing completed or overdue.
        assert_eq!(app.selected, [1, 0, 0]);
    }

    #[test]
    fn test_clamp_selection_on_empty_store() {
        let mut app = app_with_tasks(&[]);
        app.selected = [3, 3, 3];
        app.clamp_selection();
        assert_eq!(app.selected, [0, 0, 0]);
    }
}
