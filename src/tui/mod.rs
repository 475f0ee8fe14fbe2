pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::grading::GradingSettings;
use crate::output::{default_print_path, render_print_document, write_print_document};
use crate::roster::{import_roster, GeminiClient, RosterImport};

/// Upper bound for one roster import, covering file read and all retries
const IMPORT_TIMEOUT: Duration = Duration::from_secs(90);

pub async fn run_tui(mut app: App, client: GeminiClient) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250); // 250ms tick

    let mut pending_import: Option<(PathBuf, tokio::task::JoinHandle<_>)> = None;

    // Main loop
    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(anyhow::Error::from(e));
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Check if background import has completed
        if let Some((path, handle)) = pending_import.take_if(|(_, h)| h.is_finished()) {
            match handle.await {
                Ok(Ok(Ok(import))) => app.update_roster(import, path),
                Ok(Ok(Err(e))) => {
                    app.update_roster(RosterImport::failed(format!("{:#}", e)), path);
                }
                Ok(Err(_elapsed)) => {
                    app.show_flash(format!(
                        "Import timed out ({}s)",
                        IMPORT_TIMEOUT.as_secs()
                    ));
                }
                Err(e) => {
                    app.show_flash(format!("Import task panicked: {}", e));
                }
            }
            app.is_loading = false;
        }

        // Spawn requested import if none is running
        if pending_import.is_none() {
            if let Some(path) = app.pending_import.take() {
                let handle = spawn_import(client.clone(), path.clone(), app.settings);
                pending_import = Some((path, handle));
                app.is_loading = true;
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

/// Read the roster file and parse it in the background
fn spawn_import(
    client: GeminiClient,
    path: PathBuf,
    settings: GradingSettings,
) -> tokio::task::JoinHandle<Result<anyhow::Result<RosterImport>, tokio::time::error::Elapsed>> {
    tokio::spawn(async move {
        tokio::time::timeout(IMPORT_TIMEOUT, async {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok::<_, anyhow::Error>(import_roster(&client, &text, &settings).await)
        })
        .await
    })
}

/// Render the visible table to the print page and open it in the browser
fn print_visible_table(app: &App) -> anyhow::Result<PathBuf> {
    let path = default_print_path();
    let html = render_print_document(
        &app.visible_table(),
        &app.settings,
        Some(app.filter.as_str()),
        Local::now(),
    );
    write_print_document(&path, &html)?;
    crate::browser::open_path(&path)?;
    Ok(path)
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Ctrl-c quits from every mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

                // Search
                KeyCode::Char('/') => app.start_filter_input(),

                // Reconfigure
                KeyCode::Char('m') => app.start_max_score_input(),
                KeyCode::Char('h') => app.toggle_resolution(),

                // Roster import
                KeyCode::Char('i') => app.start_roster_path_input(),

                // Print
                KeyCode::Char('p') => match print_visible_table(app) {
                    Ok(path) => app.show_flash(format!("Opened print page: {}", path.display())),
                    Err(e) => app.show_flash(format!("Failed to print: {:#}", e)),
                },

                // Tab switching
                KeyCode::Tab => app.toggle_view(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::FilterInput => match key.code {
            KeyCode::Enter => app.confirm_filter_input(),
            KeyCode::Esc => app.cancel_filter_input(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Down => app.next_row(),
            KeyCode::Up => app.previous_row(),
            KeyCode::Char(c) => app.push_filter_char(c),
            _ => {}
        },
        app::InputMode::MaxScoreInput => match key.code {
            KeyCode::Enter => app.confirm_max_score_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == ',' || c == '.' || c == '-' => {
                app.input.push(c);
            }
            _ => {}
        },
        app::InputMode::RosterPathInput => match key.code {
            KeyCode::Enter => app.confirm_roster_path_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) => app.input.push(c),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
