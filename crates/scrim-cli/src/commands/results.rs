//! Results command: summary, filtered view and CSV export of an output root

use crate::args::ResultsArgs;
use crate::console::CliConsole;
use anyhow::{Context, Result};
use chrono::Local;
use scrim_core::results::{ResultsAggregator, export_file_name};
use scrim_core::{ReportFormat, ReportInput, ScrimError, generate_report};
use std::path::PathBuf;

pub async fn show(args: ResultsArgs, verbose: bool) -> Result<()> {
    let console = CliConsole::new(verbose);

    let experiment = match ResultsAggregator::latest_experiment(&args.path) {
        Ok(experiment) => experiment,
        Err(e @ ScrimError::ResultsNotFound(_)) => {
            console.warn(&format!("No results available: {}", e));
            if let Some(hint) = e.suggestion() {
                console.hint(hint);
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let set = match ResultsAggregator::load_experiment(&experiment) {
        Ok(set) => set,
        Err(e @ ScrimError::ResultsNotFound(_)) => {
            console.warn(&format!("No results available: {}", e));
            return Ok(());
        }
        Err(e) => return Err(e).context(format!("Failed to read experiment '{}'", experiment.id)),
    };

    console.info(&format!("Experiment directory: {}", experiment.path.display()));
    if let Some(snapshot) = experiment.config_snapshot() {
        console.info(&format!("Configuration snapshot: {}", snapshot.display()));
    }

    let min_challenge = args
        .min_challenge
        .or_else(|| set.challenge_range().map(|(min, _)| min))
        .unwrap_or(0);
    let view = set.filter(args.filter, min_challenge);
    let summary = set.summarize();

    let format = ReportFormat::parse(&args.format).unwrap_or_default();
    let report = generate_report(
        &ReportInput {
            experiment: Some(experiment.id.as_str()),
            summary: &summary,
            view: &view,
        },
        format,
    )?;
    println!("{}", report);

    if let Some(target) = args.export {
        let target = target.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now())));
        let csv = view.to_export()?;
        tokio::fs::write(&target, csv)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;
        console.success(&format!(
            "Exported {} row(s) to {}",
            view.len(),
            target.display()
        ));
    }

    Ok(())
}
