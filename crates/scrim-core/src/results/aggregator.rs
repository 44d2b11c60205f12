//! Locating and loading engine output

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use super::record::ResultSet;
use crate::error::{ScrimError, ScrimResult};

/// Directory under an output root holding one subdirectory per experiment
pub const EXPERIMENTS_DIR: &str = "experiments";

/// Result table inside an experiment directory
pub const RESULTS_FILE: &str = "results.csv";

/// Configuration snapshot the engine leaves next to its results
pub const EXPERIMENT_CONFIG_FILE: &str = "config.yaml";

/// One completed engine invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    pub id: String,
    pub path: PathBuf,
}

impl Experiment {
    pub fn results_file(&self) -> PathBuf {
        self.path.join(RESULTS_FILE)
    }

    /// Snapshot path, if the engine wrote one
    pub fn config_snapshot(&self) -> Option<PathBuf> {
        let path = self.path.join(EXPERIMENT_CONFIG_FILE);
        path.is_file().then_some(path)
    }
}

/// Reads result sets from an output root
pub struct ResultsAggregator;

impl ResultsAggregator {
    /// Most recent experiment under `output_path/experiments/`.
    ///
    /// Experiment directories are named by timestamp, so the lexicographically
    /// last name is the newest.
    pub fn latest_experiment(output_path: &Path) -> ScrimResult<Experiment> {
        let experiments_dir = output_path.join(EXPERIMENTS_DIR);
        let entries = fs::read_dir(&experiments_dir).map_err(|e| {
            ScrimError::results_not_found(format!(
                "cannot read {}: {}",
                experiments_dir.display(),
                e
            ))
        })?;

        let latest = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .max()
            .ok_or_else(|| {
                ScrimError::results_not_found(format!(
                    "no experiment found under {}",
                    experiments_dir.display()
                ))
            })?;

        debug!(experiment = %latest, "Selected latest experiment");
        Ok(Experiment {
            path: experiments_dir.join(&latest),
            id: latest,
        })
    }

    /// Result set of the latest experiment under `output_path`
    pub fn load(output_path: &Path) -> ScrimResult<ResultSet> {
        let experiment = Self::latest_experiment(output_path)?;
        Self::load_experiment(&experiment)
    }

    pub fn load_experiment(experiment: &Experiment) -> ScrimResult<ResultSet> {
        let results_file = experiment.results_file();
        if !results_file.is_file() {
            return Err(ScrimError::results_not_found(format!(
                "experiment '{}' has no {}",
                experiment.id, RESULTS_FILE
            )));
        }

        let file = fs::File::open(&results_file)?;
        let set = ResultSet::from_reader(file)?;
        debug!(
            experiment = %experiment.id,
            records = set.len(),
            "Loaded result set"
        );
        Ok(set)
    }
}

/// Download name for an exported result table
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("evaluation_results_{}.csv", now.format("%Y%m%d_%H%M%S"))
}
