//! Terminal UI.

use std::io::Write;

use console::Term;

use super::{should_use_colors, DepsmithTheme, OutputMode, UserInterface};

/// Writes themed output to stdout.
pub struct TerminalUI {
    term: Term,
    theme: DepsmithTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            DepsmithTheme::new()
        } else {
            DepsmithTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        // Errors go to stderr regardless of mode.
        let mut stderr = Term::stderr();
        writeln!(stderr, "{}", self.theme.format_error(msg)).ok();
    }

    fn key_value(&mut self, key: &str, value: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_key_value(key, value)).ok();
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn raw(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }
}
