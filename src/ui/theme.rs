//! Visual theme and styling.

use console::Style;

/// Styles used for terminal output.
#[derive(Debug, Clone)]
pub struct DepsmithTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warnings (orange).
    pub warning: Style,
    /// Errors (red bold).
    pub error: Style,
    /// Important text (bold).
    pub highlight: Style,
    /// Headers (magenta bold).
    pub header: Style,
    /// Keys in key-value displays (bold).
    pub key: Style,
}

impl Default for DepsmithTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DepsmithTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            key: Style::new().bold(),
        }
    }

    /// Theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            key: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("◆"),
            self.highlight.apply_to(title)
        )
    }

    /// Aligned `key  value` line for status output.
    pub fn format_key_value(&self, key: &str, value: &str) -> String {
        format!(
            "  {} {}",
            self.key.apply_to(format!("{:<12}", key)),
            value
        )
    }
}

/// Whether colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}
