//! Doctor command implementation

use crate::console::CliConsole;
use anyhow::Result;
use colored::*;
use scrim_core::ScrimSettings;
use scrim_core::health::{self, CheckResult, CheckStatus};
use std::path::Path;
use tracing::warn;

fn icon(check: &CheckResult) -> ColoredString {
    match check.status {
        CheckStatus::Pass => "✓".green().bold(),
        CheckStatus::Warn => "⚠".yellow().bold(),
        CheckStatus::Fail => "✗".red().bold(),
    }
}

/// Run environment health checks
pub async fn doctor(settings_path: &Path) -> Result<()> {
    let console = CliConsole::new(true);

    println!();
    println!("{}", "Scrim Health Check".bold().underline());
    println!("{}", "=".repeat(50).dimmed());
    println!();

    // An unreadable settings file is itself reported by the checks
    let settings = ScrimSettings::resolve(settings_path).unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default settings");
        ScrimSettings::default()
    });

    let report = health::run_all(&settings, settings_path);

    for check in &report.checks {
        println!("{} {} - {}", icon(check), check.name.bold(), check.message);
        if let Some(hint) = &check.hint {
            console.hint(hint);
        }
    }

    let pass_count = report.count(CheckStatus::Pass);
    let warn_count = report.count(CheckStatus::Warn);
    let fail_count = report.count(CheckStatus::Fail);

    println!();
    println!("{}", "-".repeat(50).dimmed());
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        pass_count.to_string().green(),
        warn_count.to_string().yellow(),
        fail_count.to_string().red()
    );

    println!();
    if fail_count > 0 {
        console.error("Some checks failed. Please fix the issues above.");
    } else if warn_count > 0 {
        console.warn("Some checks have warnings. Consider addressing them.");
    } else {
        console.success("All checks passed! Scrim is ready to run evaluations.");
    }

    Ok(())
}
