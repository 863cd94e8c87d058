//! Mock UI implementation for testing.
//!
//! `MockUI` implements [`UserInterface`] and captures everything written
//! to it for later assertion.
//!
//! # Example
//!
//! ```
//! use depsmith::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Using vcpkg path /deps/vcpkg/abc12345");
//! ui.success("vcpkg is up to date");
//!
//! assert!(ui.has_message("Using vcpkg path"));
//! assert_eq!(ui.successes(), ["vcpkg is up to date"]);
//! ```

use super::{OutputMode, UserInterface};

/// Captures UI output in memory.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    pairs: Vec<(String, String)>,
    raw: Vec<String>,
}

impl MockUI {
    /// A MockUI in Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Key-value pairs in the order shown.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value shown for `key`, if any (last one wins).
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Unstyled output such as JSON documents.
    pub fn raw_output(&self) -> String {
        self.raw.join("\n")
    }

    /// Whether any message, success or warning contains `needle`.
    pub fn has_message(&self, needle: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .any(|m| m.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn raw(&mut self, text: &str) {
        self.raw.push(text.to_string());
    }
}
