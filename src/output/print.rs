use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Local};
use html_escape::encode_text;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::formatter::format_formula;
use crate::grading::locale::{format_decimal_comma, format_points_comma};
use crate::grading::{ConversionTable, GradingSettings};

const STYLE: &str = r#"
@page { size: A4; margin: 15mm; }
body { font-family: system-ui, sans-serif; font-size: 10pt; color: #222; }
h1 { font-size: 16pt; margin: 0 0 4pt 0; }
.meta { color: #555; margin-bottom: 10pt; }
.grid { column-count: 4; column-gap: 12pt; }
.row { display: flex; justify-content: space-between; padding: 1pt 4pt; break-inside: avoid; border-bottom: 1px solid #eee; }
.score { font-variant-numeric: tabular-nums; }
.grade { font-weight: 600; font-variant-numeric: tabular-nums; }
.pass .grade { color: #1a7f37; }
.fail .grade { color: #cf222e; }
.empty { font-style: italic; }
"#;

/// Get the path the print page is written to (<cache_dir>/cijfer/print.html)
pub fn default_print_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("cijfer/print.html"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/cijfer/print.html",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Render a self-contained HTML page of the (filtered) table, laid out for
/// the browser's print dialog.
pub fn render_print_document(
    table: &ConversionTable,
    settings: &GradingSettings,
    filter: Option<&str>,
    generated: DateTime<Local>,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"nl\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Cijfertabel</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    let _ = writeln!(
        html,
        "<h1>Cijfertabel {}</h1>",
        encode_text(&format_formula(&settings.formula))
    );
    let _ = write!(
        html,
        "<div class=\"meta\">Maximum {} points, {}, pass from {}",
        format_points_comma(settings.formula.max_score),
        settings.resolution().label(),
        format_decimal_comma(settings.pass_threshold, 1)
    );
    if let Some(term) = filter.map(str::trim).filter(|t| !t.is_empty()) {
        let _ = write!(html, ", filter \"{}\"", encode_text(term));
    }
    let _ = writeln!(html, ". Generated {}.</div>", generated.format("%d-%m-%Y %H:%M"));

    if table.is_empty() {
        html.push_str("<p class=\"empty\">No results.</p>\n");
    } else {
        html.push_str("<div class=\"grid\">\n");
        for row in table {
            let class = if row.grade.is_passing(settings.pass_threshold) {
                "pass"
            } else {
                "fail"
            };
            let _ = writeln!(
                html,
                "<div class=\"row {}\"><span class=\"score\">{}</span><span class=\"grade\">{}</span></div>",
                class,
                format_points_comma(row.score),
                row.grade
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Write the print page atomically, creating parent directories as needed
pub fn write_print_document(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(html.as_bytes())
        .context("Failed to write print page")?;
    file.commit().context("Failed to save print page")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{build_table, filter_table};
    use chrono::TimeZone;
    use std::env;

    fn generated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_render_contains_rows_and_classes() {
        let settings = GradingSettings::default();
        let table = build_table(&settings.formula, settings.step).unwrap();
        let html = render_print_document(&table, &settings, None, generated());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("@page { size: A4"));
        assert!(html.contains("(p / 20) × 9 + 1"));
        assert!(html.contains("half points"));
        assert!(html.contains("19-10-2026 09:30"));
        assert_eq!(html.matches("<div class=\"row ").count(), 41);
        assert!(html.contains(
            "<div class=\"row pass\"><span class=\"score\">10</span><span class=\"grade\">5,5</span></div>"
        ));
        assert!(html.contains(
            "<div class=\"row fail\"><span class=\"score\">9,5</span><span class=\"grade\">5,3</span></div>"
        ));
    }

    #[test]
    fn test_render_escapes_filter() {
        let settings = GradingSettings::default();
        let table = build_table(&settings.formula, settings.step).unwrap();
        let filtered = filter_table(&table, "<b>");
        let html = render_print_document(&filtered, &settings, Some("<b>"), generated());
        assert!(html.contains("filter \"&lt;b&gt;\""));
        assert!(!html.contains("<b>"));
        assert!(html.contains("No results."));
    }

    #[test]
    fn test_render_escapes_ampersand_in_filter() {
        let settings = GradingSettings::default();
        let table = build_table(&settings.formula, settings.step).unwrap();
        let html = render_print_document(&table, &settings, Some("5 & <i>6</i>"), generated());
        assert!(html.contains("filter \"5 &amp; &lt;i&gt;6&lt;/i&gt;\""));
        assert!(!html.contains("<i>"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = env::temp_dir().join("cijfer_test_print_dir");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested/print.html");

        write_print_document(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_print_path() {
        assert!(default_print_path().ends_with("cijfer/print.html"));
    }
}
