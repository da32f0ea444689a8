//! Output formatting for the CLI.

use colored::*;

const RULE_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// A horizontal rule.
    pub fn rule(&self) -> String {
        "=".repeat(RULE_WIDTH)
    }

    /// Title framed by rules.
    pub fn banner(&self, title: &str) -> String {
        let rule = self.rule();
        format!("{}\n{}\n{}", rule, self.colorize(title, "cyan"), rule)
    }

    /// The extracted record, framed for the terminal.
    pub fn record_block(&self, json: &str) -> String {
        let rule = self.rule();
        format!(
            "\n{}\n{}\n{}\n{}\n{}",
            rule,
            self.colorize("CHARACTER DETAILS:", "cyan"),
            rule,
            json,
            rule
        )
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
