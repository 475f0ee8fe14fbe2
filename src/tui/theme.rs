//! Centralized theme module for TUI colors and styles

use ratatui::prelude::*;

use crate::config::ThemeChoice;
use crate::grading::Grade;

/// Concrete palette in use after auto-detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Luma above which the terminal background counts as light
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

/// Resolve the configured theme. `Auto` asks the terminal for its background
/// color and falls back to dark when it does not answer.
///
/// Must run before the terminal enters raw mode.
pub fn resolve_theme(choice: ThemeChoice) -> Theme {
    match choice {
        ThemeChoice::Dark => Theme::Dark,
        ThemeChoice::Light => Theme::Light,
        ThemeChoice::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA_THRESHOLD => Theme::Light,
            Ok(_) => Theme::Dark,
            Err(e) => {
                tracing::debug!(error = %e, "Terminal background detection failed, using dark theme");
                Theme::Dark
            }
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Grade colors
    pub pass: Color,
    pub fail: Color,
    pub bar_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            pass: Color::Green,
            fail: Color::Red,
            bar_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    /// Light theme palette, darker accents for white backgrounds
    pub fn light() -> Self {
        Self {
            pass: Color::Rgb(26, 127, 55),
            fail: Color::Rgb(207, 34, 46),
            bar_empty: Color::Indexed(250),
            row_alt_bg: Color::Indexed(255),
            index_color: Color::Indexed(244),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(242),
            title_color: Color::Blue,
            tab_active_style: Style::new().fg(Color::Blue).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(246)),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(26, 127, 55),
            flash_error: Color::Rgb(207, 34, 46),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    /// Green for passing grades, red for failing ones
    pub fn grade_color(&self, grade: Grade, threshold: f64) -> Color {
        if grade.is_passing(threshold) {
            self.pass
        } else {
            self.fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_choice_skips_detection() {
        assert_eq!(resolve_theme(ThemeChoice::Dark), Theme::Dark);
        assert_eq!(resolve_theme(ThemeChoice::Light), Theme::Light);
    }

    #[test]
    fn test_grade_color() {
        let colors = ThemeColors::dark();
        assert_eq!(colors.grade_color(Grade::from_raw(5.5), 5.5), Color::Green);
        assert_eq!(colors.grade_color(Grade::from_raw(5.4), 5.5), Color::Red);
    }
}
