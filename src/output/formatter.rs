use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::grading::locale::{format_points, format_points_comma};
use crate::grading::{ConversionTable, FormulaConfig, Grade};
use crate::roster::StudentResult;

/// Width assumed when stdout is not a terminal
const FALLBACK_WIDTH: usize = 80;

/// Space between grid columns
const COLUMN_GAP: &str = "    ";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Paint an already padded grade cell green (passing) or red (failing)
fn paint_grade(text: &str, grade: Grade, threshold: f64, use_colors: bool) -> String {
    if !use_colors {
        text.to_string()
    } else if grade.is_passing(threshold) {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format the conversion table as a grid of `points  grade` cells filling
/// the terminal width, row by row.
pub fn format_grade_grid(table: &ConversionTable, threshold: f64, use_colors: bool) -> String {
    let width = get_terminal_width().unwrap_or(FALLBACK_WIDTH);
    layout_grid(table, threshold, use_colors, width)
}

fn layout_grid(table: &ConversionTable, threshold: f64, use_colors: bool, width: usize) -> String {
    if table.is_empty() {
        return "No results.".to_string();
    }

    let score_width = table
        .iter()
        .map(|row| format_points_comma(row.score).chars().count())
        .max()
        .unwrap_or(1);
    // "10,0" is the widest grade
    let grade_width = 4;
    let cell_width = score_width + 2 + grade_width;
    let columns = ((width + COLUMN_GAP.len()) / (cell_width + COLUMN_GAP.len())).max(1);

    let cells: Vec<String> = table
        .iter()
        .map(|row| {
            let score = format!("{:>w$}", format_points_comma(row.score), w = score_width);
            let grade = format!("{:>w$}", row.grade_text(), w = grade_width);
            let grade = paint_grade(&grade, row.grade, threshold, use_colors);
            if use_colors {
                format!("{}  {}", score.dimmed(), grade)
            } else {
                format!("{}  {}", score, grade)
            }
        })
        .collect();

    cells
        .chunks(columns)
        .map(|line| line.join(COLUMN_GAP))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the table as tab-separated values for scripting
/// Columns: points, grade (no headers, no colors)
pub fn format_tsv(table: &ConversionTable) -> String {
    table
        .iter()
        .map(|row| format!("{}\t{}", format_points(row.score), row.grade))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON for anything the CLI can print (tables, student lists)
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format graded students with columns: Index, Name, Points, Grade
pub fn format_student_table(students: &[StudentResult], threshold: f64, use_colors: bool) -> String {
    layout_students(students, threshold, use_colors, get_terminal_width())
}

fn layout_students(
    students: &[StudentResult],
    threshold: f64,
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if students.is_empty() {
        return "No students found.".to_string();
    }

    let points_width = students
        .iter()
        .map(|s| format_points_comma(s.points).chars().count())
        .max()
        .unwrap_or(1)
        .max(3);
    let longest_name = students
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    // Index: 4 chars, then name, points and grade separated by two spaces
    let fixed_width = 4 + 2 + points_width + 2 + 4;
    let name_width = match term_width {
        Some(width) if width > fixed_width + 10 => longest_name.min(width - fixed_width - 2),
        Some(_) => longest_name.min(20),
        None => longest_name,
    };

    students
        .iter()
        .map(|student| {
            let index_str = format!("{:>3}.", student.id);
            let name = truncate_name(&student.name, name_width);
            let name_padded = format!("{:<w$}", name, w = name_width);
            let points = format!("{:>w$}", format_points_comma(student.points), w = points_width);
            let grade = format!("{:>4}", student.grade.to_string());
            let grade = paint_grade(&grade, student.grade, threshold, use_colors);

            if use_colors {
                format!("{}  {}  {}  {}", index_str.dimmed(), name_padded.bold(), points, grade)
            } else {
                format!("{}  {}  {}  {}", index_str, name_padded, points, grade)
            }
        })
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Students as tab-separated values
/// Columns: id, name, points, grade
///
/// Tabs and line breaks inside a name become spaces so every student stays
/// on one line with four columns.
pub fn format_students_tsv(students: &[StudentResult]) -> String {
    students
        .iter()
        .map(|s| {
            format!(
                "{}\t{}\t{}\t{}",
                s.id,
                s.name.replace(['\t', '\n', '\r'], " "),
                format_points(s.points),
                s.grade
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable formula, e.g. `(p / 20) × 9 + 1`
pub fn format_formula(formula: &FormulaConfig) -> String {
    let sign = if formula.base < 0.0 { '-' } else { '+' };
    format!(
        "(p / {}) × {} {} {}",
        format_points_comma(formula.max_score),
        format_points_comma(formula.multiplier),
        sign,
        format_points_comma(formula.base.abs())
    )
}
