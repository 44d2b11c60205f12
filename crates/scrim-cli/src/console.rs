//! CLI console utilities

use colored::*;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
    progress_bar: Option<ProgressBar>,
}

impl CliConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress_bar: None,
        }
    }

    /// Whether prompts can be shown on this terminal
    pub fn is_interactive(&self) -> bool {
        Term::stdout().is_term()
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a dimmed hint under the previous line
    pub fn hint(&self, message: &str) {
        println!("    {} {}", "→".dimmed(), message.dimmed());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.chars().count()).dimmed());
    }

    /// Print a separator
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(50).dimmed());
    }

    /// Start a spinner
    pub fn start_progress(&mut self, message: &str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.blue} {msg} {elapsed:.dim}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    /// Stop the spinner and clear its line
    pub fn finish_progress(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }
}
