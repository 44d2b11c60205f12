//! Evaluation results
//!
//! Loads the result table an engine run leaves under its output root,
//! summarizes it, filters it for display and serializes it for export.

mod aggregator;
mod record;
mod summary;

pub use aggregator::{
    EXPERIMENT_CONFIG_FILE, EXPERIMENTS_DIR, Experiment, RESULTS_FILE, ResultsAggregator,
    export_file_name,
};
pub use record::{DEFAULT_HEADERS, ResultRecord, ResultSet, Score, ScoreFilter};
pub use summary::ResultSummary;
