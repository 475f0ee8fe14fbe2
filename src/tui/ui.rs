use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

use crate::grading::locale::{format_decimal_comma, format_points_comma};
use crate::grading::Grade;
use crate::output::format_formula;
use crate::tui::app::{App, InputMode, View};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Table(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Tab bar
        Constraint::Fill(1),   // Table
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_view {
        View::Table => render_grade_table(frame, chunks[2], app),
        View::Roster => render_roster(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::MaxScoreInput => render_input_popup(frame, app, " Max score ", "Enter: apply | Esc: cancel"),
        InputMode::RosterPathInput => {
            render_input_popup(frame, app, " Import roster ", "Path to a text file | Esc: cancel")
        }
        InputMode::Help => render_help_popup(frame, &app.colors),
        InputMode::Normal | InputMode::FilterInput => {}
    }

    // Render loading overlay if loading (appears on top of everything)
    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let left = "Cijfer";
    let mut spans = vec![Span::styled(left, Style::default().fg(colors.title_color).bold())];

    let info = format!(
        "{}  {}  pass {}",
        format_formula(&app.settings.formula),
        app.settings.resolution().label(),
        format_decimal_comma(app.settings.pass_threshold, 1)
    );
    let padding_len = (area.width as usize)
        .saturating_sub(left.chars().count() + info.chars().count());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(info, Style::default().fg(colors.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let roster_title = if app.roster.students.is_empty() {
        "Roster".to_string()
    } else {
        format!("Roster ({})", app.roster.students.len())
    };
    let titles = vec!["Table".to_string(), roster_title];
    let selected = match app.current_view {
        View::Table => 0,
        View::Roster => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.colors.tab_inactive_style)
        .highlight_style(app.colors.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_empty(frame: &mut Frame, area: Rect, text: &str, colors: &ThemeColors) {
    let empty_msg = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.muted))
        .block(Block::default());
    frame.render_widget(empty_msg, area);
}

fn render_grade_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = &app.colors;
    let threshold = app.settings.pass_threshold;
    let visible = app.visible_table();

    if visible.is_empty() {
        let text = if let Some(e) = &app.table_error {
            format!("Error: {}", e)
        } else if app.filter.trim().is_empty() {
            "Max score must be positive (press m)".to_string()
        } else {
            format!("No results for '{}'", app.filter)
        };
        render_empty(frame, area, &text, colors);
        return;
    }

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let grade_color = colors.grade_color(row.grade, threshold);
            let mut grade_spans = vec![Span::styled(
                format!("{:>4} ", row.grade_text()),
                Style::default().fg(grade_color).bold(),
            )];
            grade_spans.extend(grade_bar(row.grade, threshold, 20, colors).spans);

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(Line::from(format_points_comma(row.score)).alignment(Alignment::Right)),
                Cell::from(Line::from(grade_spans)),
            ])
            .style(row_style)
        })
        .collect();
    // Release the borrow of `app` before rendering with its table state
    drop(visible);

    let widths = [
        Constraint::Length(8),  // Points
        Constraint::Length(26), // Grade + bar
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec![
                Cell::from(Line::from("Points").alignment(Alignment::Right)),
                Cell::from("Grade"),
            ])
            .style(colors.header_style)
            .bottom_margin(1),
        )
        .column_spacing(3)
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_roster(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = &app.colors;
    let threshold = app.settings.pass_threshold;

    if app.roster.students.is_empty() {
        let text = match &app.roster.failure {
            Some(e) => format!("Import failed: {}", e),
            None => "No roster loaded (press i to import a file)".to_string(),
        };
        render_empty(frame, area, &text, colors);
        return;
    }

    let rows: Vec<Row> = app
        .roster
        .students
        .iter()
        .enumerate()
        .map(|(idx, student)| {
            let grade_color = colors.grade_color(student.grade, threshold);
            let mut grade_spans = vec![Span::styled(
                format!("{:>4} ", student.grade.to_string()),
                Style::default().fg(grade_color).bold(),
            )];
            grade_spans.extend(grade_bar(student.grade, threshold, 10, colors).spans);

            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{}.", student.id)).style(Style::default().fg(colors.index_color)),
                Cell::from(student.name.clone()),
                Cell::from(Line::from(format_points_comma(student.points)).alignment(Alignment::Right)),
                Cell::from(Line::from(grade_spans)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Index: "99."
        Constraint::Fill(1),    // Name
        Constraint::Length(8),  // Points
        Constraint::Length(16), // Grade + bar
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec![
                Cell::from("#"),
                Cell::from("Name"),
                Cell::from(Line::from("Points").alignment(Alignment::Right)),
                Cell::from("Grade"),
            ])
            .style(colors.header_style)
            .bottom_margin(1),
        )
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.roster_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;

    let text = if app.input_mode == InputMode::FilterInput {
        Line::from(vec![
            Span::styled("/", Style::default().fg(colors.status_key_color)),
            Span::raw(format!("{}|", app.filter)),
            Span::styled(
                "  Enter: keep | Esc: clear",
                Style::default().fg(colors.muted),
            ),
        ])
    } else if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Failed")
            || msg.starts_with("Error")
            || msg.starts_with("Invalid")
            || msg.starts_with("Import failed")
        {
            colors.flash_error
        } else {
            colors.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let count = match app.current_view {
            View::Table => {
                let visible = app.visible_table().len();
                if app.filter.trim().is_empty() {
                    format!("{} rows", visible)
                } else {
                    format!("{}/{} rows '{}'", visible, app.table.len(), app.filter)
                }
            }
            View::Roster => format!(
                "{} students, {} passing",
                app.roster.students.len(),
                app.roster.passing_count(app.settings.pass_threshold)
            ),
        };

        // Build hints with colored shortcut keys
        let hints = [
            ("j/k", ":nav "),
            ("/", ":search "),
            ("m", ":max "),
            ("h", ":half/whole "),
            ("i", ":import "),
            ("p", ":print "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(count, Style::default().fg(colors.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(colors.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area,
    );
}

/// Horizontal bar for a grade on the 1–10 scale, colored by pass/fail
fn grade_bar(grade: Grade, threshold: f64, width: usize, colors: &ThemeColors) -> Line<'static> {
    let ratio = ((grade.value() - 1.0) / 9.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_color = colors.grade_color(grade, threshold);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(bar_color)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(colors.bar_empty)));
    }

    Line::from(spans)
}

/// Render a single-line text input popup
fn render_input_popup(frame: &mut Frame, app: &App, title: &str, help: &str) {
    let popup_area = centered_rect_fixed(50, 5, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(title.to_string(), app.colors.popup_title))
        .border_style(Style::default().fg(app.colors.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    let input = Paragraph::new(format!("{}|", app.input));
    frame.render_widget(input, chunks[0]);

    let help = Paragraph::new(help.to_string()).style(Style::default().fg(app.colors.muted));
    frame.render_widget(help, chunks[1]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 15, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(colors.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("/             ", "Search points or grade"),
        ("m             ", "Set max score"),
        ("h             ", "Toggle whole/half points"),
        ("i             ", "Import roster file"),
        ("p             ", "Print table via browser"),
        ("Tab           ", "Toggle Table/Roster"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, action)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*action)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let loading_text = Paragraph::new(format!("{} Reading roster...", spinner))
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.colors.title_color));

    frame.render_widget(loading_text, inner);
}
