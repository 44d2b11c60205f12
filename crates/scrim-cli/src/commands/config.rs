//! Settings file management commands

use crate::console::CliConsole;
use anyhow::{Result, bail};
use colored::*;
use scrim_core::ScrimSettings;
use std::path::Path;

/// Show effective settings
pub async fn show(settings_path: &Path) -> Result<()> {
    let console = CliConsole::new(true);

    console.print_header("Settings");

    if settings_path.exists() {
        console.success(&format!("Loaded settings from: {}", settings_path.display()));
    } else {
        console.warn(&format!("Settings file not found: {}", settings_path.display()));
        console.info("Using default settings");
    }

    let settings = super::load_settings(settings_path)?;
    print_settings(&console, &settings);
    Ok(())
}

/// Validate the settings file
pub async fn validate(settings_path: &Path) -> Result<()> {
    let console = CliConsole::new(true);

    console.print_header("Settings Validation");

    if !settings_path.exists() {
        bail!("Settings file not found: {}", settings_path.display());
    }

    console.info(&format!("Validating settings file: {}", settings_path.display()));

    let settings = match ScrimSettings::resolve(settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            console.error(&format!("Failed to load settings: {e}"));
            return Err(e.into());
        }
    };
    console.success("Settings file loaded successfully");

    if let Err(e) = settings.validate() {
        console.error(&format!("Settings validation failed: {e}"));
        if let Some(hint) = e.suggestion() {
            console.hint(hint);
        }
        return Err(e.into());
    }

    console.success("Settings are valid");
    console.print_separator();
    print_settings(&console, &settings);
    Ok(())
}

/// Write a settings file with defaults
pub async fn init(settings_path: &Path, force: bool) -> Result<()> {
    let console = CliConsole::new(true);

    console.print_header("Settings Initialization");

    if settings_path.exists() && !force {
        console.error(&format!(
            "Settings file already exists: {}",
            settings_path.display()
        ));
        console.info("Use --force to overwrite");
        bail!("Settings file already exists");
    }

    ScrimSettings::default().save(settings_path)?;

    console.success(&format!("Created settings file: {}", settings_path.display()));
    console.info("Run 'scrim keys setup' to store provider API keys");
    Ok(())
}

fn print_settings(console: &CliConsole, settings: &ScrimSettings) {
    console.info(&format!(
        "Default Model: {} ({})",
        settings.default_model.green(),
        settings.default_provider
    ));
    console.info(&format!(
        "Credentials: {}",
        settings.credentials_path.display().to_string().cyan()
    ));
    console.info(&format!(
        "Results Root: {}",
        settings.results_root.display().to_string().cyan()
    ));

    let eval = &settings.evaluation;
    console.info(&format!(
        "Evaluation: {} samples, {} workers, difficulty {}-{}, cost limit ${:.2}",
        eval.num_samples,
        eval.num_workers,
        eval.min_difficulty,
        eval.max_difficulty,
        eval.cost_limit
    ));

    console.info(&format!(
        "Executor: {} {}",
        settings.executor.program.yellow(),
        settings.executor.args.join(" ").dimmed()
    ));
    if let Some(dir) = &settings.executor.working_dir {
        console.info(&format!("Executor Working Directory: {}", dir.display()));
    }
}
