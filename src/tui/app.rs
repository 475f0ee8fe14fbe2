use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Instant;

use ratatui::widgets::TableState;

use crate::grading::locale::{format_points_comma, parse_decimal};
use crate::grading::{build_table, filter_table, grade_for, ConversionTable, GradingSettings};
use crate::roster::RosterImport;
use crate::tui::theme::ThemeColors;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Table,
    Roster,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    FilterInput,
    MaxScoreInput,
    RosterPathInput,
    Help,
}

pub struct App {
    pub settings: GradingSettings,
    /// Full table for the current settings; filtered on every draw
    pub table: ConversionTable,
    pub table_error: Option<String>,
    pub filter: String,
    pub roster: RosterImport,
    pub roster_source: Option<PathBuf>,
    pub table_state: TableState,
    pub roster_state: TableState,
    pub current_view: View,
    pub input_mode: InputMode,
    /// Edit buffer for the max score and roster path popups
    pub input: String,
    pub flash_message: Option<(String, Instant)>,
    /// Roster file waiting to be picked up by the event loop
    pub pending_import: Option<PathBuf>,
    pub should_quit: bool,
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub colors: ThemeColors,
}

impl App {
    pub fn new(settings: GradingSettings, colors: ThemeColors) -> Self {
        let mut app = Self {
            settings,
            table: ConversionTable::default(),
            table_error: None,
            filter: String::new(),
            roster: RosterImport::default(),
            roster_source: None,
            table_state: TableState::default(),
            roster_state: TableState::default(),
            current_view: View::Table,
            input_mode: InputMode::Normal,
            input: String::new(),
            flash_message: None,
            pending_import: None,
            should_quit: false,
            is_loading: false,
            spinner_frame: 0,
            colors,
        };
        app.rebuild();
        app
    }

    /// Regenerate the whole table from the current settings and regrade the
    /// roster.
    pub fn rebuild(&mut self) {
        match build_table(&self.settings.formula, self.settings.step) {
            Ok(table) => {
                self.table = table;
                self.table_error = None;
            }
            Err(e) => {
                self.table = ConversionTable::default();
                self.table_error = Some(e.to_string());
            }
        }
        tracing::debug!(
            rows = self.table.len(),
            max_score = self.settings.formula.max_score,
            step = self.settings.step,
            "Table rebuilt"
        );

        for student in &mut self.roster.students {
            student.grade = grade_for(student.points, &self.settings.formula);
        }

        self.clamp_selection();
    }

    /// Rows matching the current filter
    pub fn visible_table(&self) -> Cow<'_, ConversionTable> {
        filter_table(&self.table, &self.filter)
    }

    fn current_len(&self) -> usize {
        match self.current_view {
            View::Table => self.visible_table().len(),
            View::Roster => self.roster.students.len(),
        }
    }

    fn current_state(&mut self) -> &mut TableState {
        match self.current_view {
            View::Table => &mut self.table_state,
            View::Roster => &mut self.roster_state,
        }
    }

    /// Keep the selection inside the current list, selecting the first row
    /// when there was none
    fn clamp_selection(&mut self) {
        let len = self.current_len();
        let state = self.current_state();
        if len == 0 {
            state.select(None);
        } else {
            let selected = state.selected().map_or(0, |i| i.min(len - 1));
            state.select(Some(selected));
        }
    }

    pub fn next_row(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        state.select(Some(i));
    }

    /// Toggle between the Table and Roster views
    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Table => View::Roster,
            View::Roster => View::Table,
        };
        self.clamp_selection();
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Start live search; the table view is always the one searched
    pub fn start_filter_input(&mut self) {
        self.current_view = View::Table;
        self.input_mode = InputMode::FilterInput;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.table_state.select(Some(0));
        self.clamp_selection();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.clamp_selection();
    }

    /// Keep the filter and return to normal mode
    pub fn confirm_filter_input(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Drop the filter and return to normal mode
    pub fn cancel_filter_input(&mut self) {
        self.filter.clear();
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn start_max_score_input(&mut self) {
        self.input = format_points_comma(self.settings.formula.max_score);
        self.input_mode = InputMode::MaxScoreInput;
    }

    pub fn confirm_max_score_input(&mut self) {
        self.input_mode = InputMode::Normal;
        match parse_decimal(&self.input) {
            Some(max) => {
                self.settings.formula.max_score = max;
                self.rebuild();
                let message = match &self.table_error {
                    Some(e) => format!("Error: {}", e),
                    None if max <= 0.0 => "Max score must be positive for a table".to_string(),
                    None => format!("Max score set to {}", format_points_comma(max)),
                };
                self.show_flash(message);
            }
            None => self.show_flash(format!("Invalid max score: '{}'", self.input)),
        }
        self.input.clear();
    }

    pub fn start_roster_path_input(&mut self) {
        if self.is_loading {
            self.show_flash("Import already running".to_string());
            return;
        }
        self.input = self
            .roster_source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.input_mode = InputMode::RosterPathInput;
    }

    pub fn confirm_roster_path_input(&mut self) {
        self.input_mode = InputMode::Normal;
        let path = self.input.trim();
        if path.is_empty() {
            self.show_flash("Import cancelled".to_string());
        } else {
            self.pending_import = Some(PathBuf::from(path));
        }
        self.input.clear();
    }

    /// Leave any text popup without applying it
    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Switch between whole and half points
    pub fn toggle_resolution(&mut self) {
        let resolution = self.settings.resolution().toggle();
        self.settings.step = resolution.step();
        self.rebuild();
        self.show_flash(format!("Showing {}", resolution.label()));
    }

    /// Replace the roster with a finished import and show it
    pub fn update_roster(&mut self, import: RosterImport, source: PathBuf) {
        let message = match &import.failure {
            Some(e) => format!("Import failed: {}", e),
            None if import.skipped > 0 => format!(
                "Imported {} students ({} skipped)",
                import.students.len(),
                import.skipped
            ),
            None => format!("Imported {} students", import.students.len()),
        };
        self.roster = import;
        self.roster_source = Some(source);
        self.rebuild();
        self.current_view = View::Roster;
        self.roster_state.select(None);
        self.clamp_selection();
        self.show_flash(message);
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}
