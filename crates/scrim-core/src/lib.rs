//! Scrim Core Library
//!
//! Controller for scenario-based evaluation runs of conversational agents.
//! It turns an agent prompt, a model selection and a handful of evaluation
//! parameters into a run configuration, drives an external simulation engine
//! through one run, and reads back the scored scenario table it leaves behind.

pub mod config;
pub mod credentials;
pub mod error;
pub mod health;
pub mod provider;
pub mod report;
pub mod results;
pub mod session;
pub mod settings;

// Re-export commonly used types
pub use config::{ConfigBuilder, EvaluationParameters, RunConfiguration};
pub use credentials::{ConfigStatus, CredentialEntry, CredentialStatus, CredentialStore};
pub use error::{ScrimError, ScrimResult, ValidationError};
pub use provider::{LlmSelection, Provider, ProviderRegistry, SharedSelection};
pub use report::{ReportFormat, ReportInput, generate_report};
pub use results::{ResultRecord, ResultSet, ResultSummary, ResultsAggregator, Score, ScoreFilter};
pub use session::{
    ExecutorSettings, ProcessExecutor, RunSession, RunState, SessionOrchestrator,
    SimulationExecutor,
};
pub use settings::ScrimSettings;
