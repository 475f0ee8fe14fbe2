pub mod formatter;
pub mod print;

pub use formatter::{
    format_formula, format_grade_grid, format_json, format_student_table, format_students_tsv,
    format_tsv, should_use_colors,
};
pub use print::{default_print_path, render_print_document, write_print_document};
