//! Terminal output.
//!
//! Success and info lines go to stdout, warnings and errors to stderr, so
//! `--json` output stays machine-readable.

use crossterm::style::{Color, Stylize};

/// Status icons.
#[derive(Debug, Clone)]
pub struct Icons {
    /// ✓
    pub success: &'static str,
    /// ✗
    pub error: &'static str,
    /// ⚠
    pub warning: &'static str,
    /// ℹ
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}

/// Colors for each severity.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Cask names
    pub token: Color,
    /// Versions, paths and other secondary text
    pub secondary: Color,
    /// Success states
    pub success: Color,
    /// Warning states
    pub warning: Color,
    /// Error states
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            token: Color::Cyan,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

/// Visual theme.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors
    pub colors: ColorScheme,
    /// Icons
    pub icons: Icons,
}

/// A cloneable handle for printing status lines.
#[derive(Debug, Clone, Default)]
pub struct Output {
    theme: Theme,
}

impl Output {
    /// Create a new output handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints a bold header line: `token version`.
    pub fn header(&self, token: &str, version: &str) {
        println!(
            "  {} {}",
            token.with(self.theme.colors.token).bold(),
            version.with(self.theme.colors.secondary)
        );
    }

    /// Prints a `label  value` row aligned under a header.
    pub fn field(&self, label: &str, value: &str) {
        println!("  {label:<12}{value}");
    }

    /// Prints an informational message to the console.
    pub fn info(&self, msg: &str) {
        println!("  {} {}", self.theme.icons.info, msg);
    }

    /// Prints a success message to the console.
    pub fn success(&self, msg: &str) {
        println!(
            "  {} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            msg
        );
    }

    /// Prints a warning message to stderr.
    pub fn warning(&self, msg: &str) {
        eprintln!(
            "  {} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            msg.with(self.theme.colors.warning)
        );
    }

    /// Prints an error message to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!(
            "  {} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            msg
        );
    }

    /// Displays a count summary, e.g. `3 manifests valid`.
    pub fn summary_plain(&self, count: usize, noun: &str, status: &str) {
        let msg = format!(
            "{} {}{} {}",
            count,
            noun,
            if count == 1 { "" } else { "s" },
            status
        );
        self.success(&msg);
    }
}
