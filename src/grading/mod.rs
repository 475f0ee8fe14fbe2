pub mod config;
pub mod filter;
pub mod formula;
pub mod locale;
pub mod table;
pub mod validation;

pub use config::{GradingConfig, GradingSettings, Resolution};
pub use filter::filter_table;
pub use formula::{compute_grade, grade_for, FormulaConfig, Grade, DEFAULT_PASS_THRESHOLD};
pub use table::{build_table, ConversionRow, ConversionTable, TableError};
pub use validation::validate_grading;
