//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::ClusterupTheme;
use super::SpinnerHandle;

/// A progress spinner shown while a collaborator runs.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: ClusterupTheme,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            theme: ClusterupTheme::detect(),
        }
    }

    /// Create a spinner that doesn't show (for quiet/silent modes).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: ClusterupTheme::plain(),
        }
    }

    fn finish_with(&mut self, line: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish_with(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_finishes_with_message() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Running cluster");
        spinner.finish_success("cluster");
        assert_eq!(spinner.bar.message(), "✓ cluster");
        assert!(spinner.bar.is_finished());
    }

    #[test]
    fn hidden_spinner_error_and_skip() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.finish_error("monitoring");
        assert_eq!(spinner.bar.message(), "✗ monitoring");

        let mut spinner = ProgressSpinner::hidden();
        spinner.finish_skipped("security");
        assert_eq!(spinner.bar.message(), "○ security");
    }
}
