use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use cijfer::grading::locale::{format_points_comma, parse_decimal};
use cijfer::grading::{GradingConfig, GradingSettings};
use cijfer::roster::RosterConfig;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_PRINT: i32 = 2;
const EXIT_ROSTER: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum TableFormat {
    Grid,
    Tsv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum RosterFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the conversion table (default when stdout is not a terminal)
    Table {
        /// Only rows whose points or grade contain this text
        #[arg(short, long)]
        filter: Option<String>,

        #[arg(long, value_enum, default_value_t = TableFormat::Grid)]
        format: TableFormat,
    },
    /// Interactive table (default when stdout is a terminal)
    Tui {
        /// Prompt for the API key used by roster import if none is set
        #[arg(long)]
        ask_key: bool,
    },
    /// Convert individual scores
    Grade {
        /// Points, with a decimal comma or period
        #[arg(required = true, allow_hyphen_values = true, value_parser = parse_number)]
        scores: Vec<f64>,
    },
    /// Write the table as a printable page and open it in the browser
    Print {
        #[arg(short, long)]
        filter: Option<String>,

        /// Where to write the page (defaults to the cache directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only write the page, do not open the browser
        #[arg(long)]
        no_open: bool,
    },
    /// Extract students and points from a text file and grade them
    Roster {
        /// Roster text file; reads stdin when omitted or "-"
        file: Option<PathBuf>,

        /// Prompt for the API key if none is set in the environment
        #[arg(long)]
        ask_key: bool,

        #[arg(long, value_enum, default_value_t = RosterFormat::Table)]
        format: RosterFormat,
    },
}

#[derive(Parser, Debug)]
#[command(name = "cijfer")]
#[command(about = "Convert test points into 1-10 grades", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/cijfer/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Maximum attainable points
    #[arg(short, long, global = true, value_parser = parse_number)]
    max: Option<f64>,

    /// Points between table rows (1 or 0,5)
    #[arg(short, long, global = true, value_parser = parse_number)]
    step: Option<f64>,

    /// Formula multiplier
    #[arg(long, global = true, value_parser = parse_number)]
    multiplier: Option<f64>,

    /// Formula base, the grade for zero points
    #[arg(long, global = true, allow_hyphen_values = true, value_parser = parse_number)]
    base: Option<f64>,

    /// Lowest passing grade
    #[arg(long, global = true, value_parser = parse_number)]
    pass: Option<f64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// Grading values given on the command line; unset flags stay `None`
    fn grading_overrides(&self) -> GradingConfig {
        GradingConfig {
            max_score: self.max,
            multiplier: self.multiplier,
            base: self.base,
            step: self.step,
            pass_threshold: self.pass,
        }
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    parse_decimal(s).ok_or_else(|| format!("'{}' is not a number", s))
}

fn print_errors(header: &str, errors: &[String]) {
    eprintln!("{}", header);
    for error in errors {
        eprintln!("  - {}", error);
    }
}

fn read_roster_text(file: Option<&PathBuf>) -> anyhow::Result<String> {
    use anyhow::Context;
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file {}", path.display())),
        _ => std::io::read_to_string(std::io::stdin()).context("Failed to read roster from stdin"),
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); an error
    // only means one is installed already
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    if let Err(e) = cijfer::telemetry::init(cli.verbose) {
        eprintln!("Logging disabled: {}", e);
    }

    // Load config
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let config = match cijfer::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // File values over defaults, flags over file values
    let grading_config = GradingConfig::default()
        .merge(&config.grading.clone().unwrap_or_default())
        .merge(&cli.grading_overrides());
    let roster_config: RosterConfig = config.roster.clone().unwrap_or_default();

    // Validate everything at startup
    let mut errors = Vec::new();
    if let Err(e) = cijfer::grading::validate_grading(&grading_config) {
        errors.extend(e);
    }
    if let Err(e) = cijfer::roster::validate_roster(&roster_config) {
        errors.extend(e);
    }
    if !errors.is_empty() {
        print_errors("Config errors:", &errors);
        std::process::exit(EXIT_CONFIG);
    }

    let settings: GradingSettings = grading_config.resolve();
    let roster_settings = match roster_config.resolve() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    tracing::debug!(
        max_score = settings.formula.max_score,
        multiplier = settings.formula.multiplier,
        base = settings.formula.base,
        step = settings.step,
        pass_threshold = settings.pass_threshold,
        "Resolved grading settings"
    );

    let command = cli.command.unwrap_or_else(|| {
        if std::io::stdout().is_terminal() {
            Commands::Tui { ask_key: false }
        } else {
            Commands::Table {
                filter: None,
                format: TableFormat::Grid,
            }
        }
    });

    let use_colors = cijfer::output::should_use_colors();

    match command {
        Commands::Table { filter, format } => {
            let table = match cijfer::grading::build_table(&settings.formula, settings.step) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Cannot build table: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let visible = cijfer::grading::filter_table(&table, filter.as_deref().unwrap_or(""));

            let output = match format {
                TableFormat::Grid => cijfer::output::format_grade_grid(
                    &visible,
                    settings.pass_threshold,
                    use_colors,
                ),
                TableFormat::Tsv => cijfer::output::format_tsv(&visible),
                TableFormat::Json => match cijfer::output::format_json(&*visible) {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("Failed to serialize table: {}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
            };

            if format == TableFormat::Grid && use_colors {
                println!("{}\n", cijfer::output::format_formula(&settings.formula));
            }
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Commands::Tui { ask_key } => {
            let api_key = if ask_key {
                match cijfer::credentials::resolve_api_key(true) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        eprintln!("Credential error: {}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                }
            } else {
                cijfer::credentials::get_api_key_from_env()
            };

            let client = match cijfer::roster::GeminiClient::new(roster_settings, api_key) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to create HTTP client: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            // Detect before the terminal enters raw mode
            let theme = cijfer::tui::resolve_theme(config.theme);
            let app = cijfer::tui::App::new(settings, cijfer::tui::ThemeColors::for_theme(theme));

            if let Err(e) = cijfer::tui::run_tui(app, client).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        Commands::Grade { scores } => {
            let width = scores
                .iter()
                .map(|s| format_points_comma(*s).chars().count())
                .max()
                .unwrap_or(0);
            let formula = settings.formula;
            for score in scores {
                let grade = cijfer::grading::compute_grade(
                    score,
                    formula.max_score,
                    formula.multiplier,
                    formula.base,
                );
                println!("{:>width$}  {}", format_points_comma(score), grade, width = width);
            }
        }
        Commands::Print {
            filter,
            output,
            no_open,
        } => {
            let table = match cijfer::grading::build_table(&settings.formula, settings.step) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Cannot build table: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let term = filter.as_deref().unwrap_or("");
            let visible = cijfer::grading::filter_table(&table, term);
            let html = cijfer::output::render_print_document(
                &visible,
                &settings,
                filter.as_deref(),
                chrono::Local::now(),
            );

            let path = output.unwrap_or_else(cijfer::output::default_print_path);
            if let Err(e) = cijfer::output::write_print_document(&path, &html) {
                eprintln!("Failed to write print page: {:#}", e);
                std::process::exit(EXIT_PRINT);
            }

            if !no_open {
                if let Err(e) = cijfer::browser::open_path(&path) {
                    eprintln!("Failed to open browser: {:#}", e);
                    eprintln!("The page was written to {}", path.display());
                    std::process::exit(EXIT_PRINT);
                }
            }
            println!("{}", path.display());
        }
        Commands::Roster {
            file,
            ask_key,
            format,
        } => {
            let text = match read_roster_text(file.as_ref()) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let api_key = match cijfer::credentials::resolve_api_key(ask_key) {
                Ok(key) => key,
                Err(e) => {
                    eprintln!("Credential error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let client = match cijfer::roster::GeminiClient::new(roster_settings, Some(api_key)) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to create HTTP client: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let import = cijfer::roster::import_roster(&client, &text, &settings).await;
            if let Some(failure) = &import.failure {
                eprintln!("Roster import failed: {}", failure);
                std::process::exit(EXIT_ROSTER);
            }

            let output = match format {
                RosterFormat::Table => cijfer::output::format_student_table(
                    &import.students,
                    settings.pass_threshold,
                    use_colors,
                ),
                RosterFormat::Tsv => cijfer::output::format_students_tsv(&import.students),
                RosterFormat::Json => match cijfer::output::format_json(&import.students) {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("Failed to serialize roster: {}", e);
                        std::process::exit(EXIT_ROSTER);
                    }
                },
            };
            if !output.is_empty() {
                println!("{}", output);
            }

            if format == RosterFormat::Table {
                eprintln!(
                    "{} students, {} passing{}",
                    import.students.len(),
                    import.passing_count(settings.pass_threshold),
                    if import.skipped > 0 {
                        format!(", {} skipped", import.skipped)
                    } else {
                        String::new()
                    }
                );
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_accepts_comma() {
        assert_eq!(parse_number("7,5"), Ok(7.5));
        assert_eq!(parse_number("-1"), Ok(-1.0));
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from(["cijfer", "--max", "40", "--step", "1", "table"]).unwrap();
        let overrides = cli.grading_overrides();
        assert_eq!(overrides.max_score, Some(40.0));
        assert_eq!(overrides.step, Some(1.0));
        assert_eq!(overrides.base, None);

        let merged = GradingConfig::default().merge(&overrides).resolve();
        assert_eq!(merged.formula.max_score, 40.0);
        assert_eq!(merged.formula.multiplier, 9.0);
    }

    #[test]
    fn test_grade_scores_with_comma_and_negative() {
        let cli = Cli::try_parse_from(["cijfer", "grade", "12,5", "-3"]).unwrap();
        match cli.command {
            Some(Commands::Grade { scores }) => assert_eq!(scores, vec![12.5, -3.0]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
