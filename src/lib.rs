pub mod browser;
pub mod config;
pub mod credentials;
pub mod grading;
pub mod output;
pub mod roster;
pub mod stderr_buffer;
pub mod telemetry;
pub mod tui;
