//! Run command: build a configuration and drive one evaluation session

use crate::args::RunArgs;
use crate::console::CliConsole;
use anyhow::{Context, Result, bail};
use chrono::Local;
use colored::*;
use scrim_core::credentials::{CredentialStatus, is_configured};
use scrim_core::results::ResultsAggregator;
use scrim_core::{
    ConfigBuilder, EvaluationParameters, LlmSelection, ProcessExecutor, RunSession, RunState,
    ScrimError, ScrimSettings, SessionOrchestrator, SharedSelection,
};
use std::path::{Path, PathBuf};
use tracing::debug;

pub async fn execute(settings_path: &Path, args: RunArgs, verbose: bool) -> Result<()> {
    let mut console = CliConsole::new(verbose);
    let settings = super::load_settings(settings_path)?;

    let prompt = read_prompt(&args).await?;
    let selection = SharedSelection::new(selection_for(&args, &settings));
    let params = parameters_for(&args, &settings.evaluation);

    let config = match ConfigBuilder::build(&prompt, &selection, &params) {
        Ok(config) => config,
        Err(e) => {
            console.error(&e.to_string());
            if let Some(hint) = ScrimError::from(e).suggestion() {
                console.hint(hint);
            }
            bail!("invalid run parameters");
        }
    };

    if args.dry_run {
        let yaml = config
            .to_yaml()
            .context("Failed to render run configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    console.print_header("Evaluation Run");
    println!(
        "Model: {} ({})",
        selection.model().cyan(),
        selection.provider().display_name()
    );
    println!(
        "Scenarios: {} | Workers: {} | Difficulty: {}-{} | Cost limit: ${:.2}",
        params.num_samples,
        params.num_workers,
        params.min_difficulty,
        params.max_difficulty,
        params.cost_limit
    );
    report_credentials(&console, &settings, &selection);

    let output_path = args.output.clone().unwrap_or_else(|| default_output_path(&settings));
    println!("Output: {}", output_path.display().to_string().dimmed());
    println!();

    let orchestrator = SessionOrchestrator::new(ProcessExecutor::new(settings.executor.clone()));
    let mut session = RunSession::new();

    console.start_progress("Running evaluation (this may take several minutes)...");
    let state = orchestrator
        .start(&mut session, config, output_path)
        .await;
    console.finish_progress();

    match state? {
        RunState::Completed => {
            let elapsed = session
                .duration()
                .map(|d| format!(" in {}s", d.num_seconds()))
                .unwrap_or_default();
            console.success(&format!("Evaluation completed{}", elapsed));
            if let Some(output) = session.output_path() {
                print_run_summary(&console, output);
            }
            Ok(())
        }
        _ => {
            match session.failure() {
                Some(failure) => console.error(&failure.to_string()),
                None => console.error("Evaluation failed"),
            }
            bail!("evaluation run failed")
        }
    }
}

async fn read_prompt(args: &RunArgs) -> Result<String> {
    match (&args.prompt_file, &args.prompt) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt file {}", path.display())),
        (None, Some(text)) => Ok(text.clone()),
        (None, None) => bail!("Provide --prompt or --prompt-file"),
    }
}

/// Provider and model from flags, falling back to settings
fn selection_for(args: &RunArgs, settings: &ScrimSettings) -> LlmSelection {
    let provider = args.provider.unwrap_or(settings.default_provider);
    match &args.model {
        Some(model) => LlmSelection::new(provider, model.clone()),
        None if provider == settings.default_provider => settings.default_selection(),
        None => LlmSelection::with_default_model(provider),
    }
}

fn parameters_for(args: &RunArgs, defaults: &EvaluationParameters) -> EvaluationParameters {
    let mut params = defaults.clone();
    if let Some(n) = args.num_samples {
        params = params.with_num_samples(n);
    }
    if let Some(limit) = args.cost_limit {
        params = params.with_cost_limit(limit);
    }
    if let Some(n) = args.num_workers {
        params = params.with_num_workers(n);
    }
    let min = args.min_difficulty.unwrap_or(params.min_difficulty);
    let max = args.max_difficulty.unwrap_or(params.max_difficulty);
    params.with_difficulty(min, max)
}

fn default_output_path(settings: &ScrimSettings) -> PathBuf {
    settings
        .results_root
        .join(format!("evaluation_{}", Local::now().format("%Y%m%d_%H%M%S")))
}

/// Credential problems only warn; the engine may get keys elsewhere
fn report_credentials(console: &CliConsole, settings: &ScrimSettings, selection: &SharedSelection) {
    let provider = selection.provider();
    match CredentialStatus::new(&settings.credentials_path).check(provider) {
        Ok(entries) if is_configured(&entries) => {
            console.success(&format!("{} credentials configured", provider.display_name()));
        }
        Ok(entries) => {
            let missing: Vec<&str> = entries
                .iter()
                .filter(|e| !e.is_present)
                .map(|e| e.field_name.as_str())
                .collect();
            console.warn(&format!(
                "{} credentials incomplete, missing {}",
                provider.display_name(),
                missing.join(", ")
            ));
            console.hint("Run 'scrim keys setup'");
        }
        Err(e) => {
            console.warn(&e.to_string());
            if let Some(hint) = e.suggestion() {
                console.hint(hint);
            }
        }
    }
}

fn print_run_summary(console: &CliConsole, output: &Path) {
    let loaded = ResultsAggregator::latest_experiment(output)
        .and_then(|experiment| ResultsAggregator::load_experiment(&experiment));

    match loaded {
        Ok(set) => {
            let summary = set.summarize();
            console.print_separator();
            println!("Total Scenarios:     {}", summary.total);
            println!("Success Rate:        {:.1}%", summary.success_rate);
            println!("Failure Rate:        {:.1}%", summary.failure_rate);
            println!("Avg Challenge Level: {:.1}", summary.avg_challenge_level);
            console.print_separator();
            println!(
                "Inspect with: {}",
                format!("scrim results {}", output.display()).cyan()
            );
        }
        Err(e) => {
            debug!(error = %e, "No results after completed run");
            if e.is_recoverable() {
                console.warn(&e.to_string());
            } else {
                console.error(&e.to_string());
            }
            if let Some(hint) = e.suggestion() {
                console.hint(hint);
            }
        }
    }
}
