//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for real terminals
//! - [`MockUI`] for tests
//! - Download progress bars and human-readable formatting
//!
//! Diagnostic logging goes through `tracing`; this layer is for the
//! results a user asked for.
//!
//! # Example
//!
//! ```
//! use depsmith::ui::{create_ui, OutputMode, UserInterface};
//!
//! let mut ui = create_ui(OutputMode::Quiet);
//! ui.show_header("Qt");
//! ui.success("Qt is up to date");
//! ```

pub mod format;
pub mod mock;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use format::{format_age, format_duration};
pub use mock::MockUI;
pub use output::OutputMode;
pub use progress::download_bar;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, DepsmithTheme};

/// Trait for user-facing output.
///
/// This trait allows capturing output in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning.
    fn warning(&mut self, msg: &str);

    /// Display an error. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Display an aligned `key value` line.
    fn key_value(&mut self, key: &str, value: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Write text verbatim, in every mode (machine-readable output).
    fn raw(&mut self, text: &str);
}

/// Create the terminal UI for a run.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
