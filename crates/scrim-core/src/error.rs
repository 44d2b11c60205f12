//! Error types for the evaluation session controller
//!
//! Every failure the controller can hit is represented here as data. None of
//! these are meant to terminate the hosting process: callers render them as
//! warnings or as the error field of a failed session.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for controller operations
pub type ScrimResult<T> = Result<T, ScrimError>;

/// Bad operator input, detected before a run is ever started
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Prompt is empty or whitespace-only
    #[error("agent prompt is empty")]
    EmptyPrompt,

    /// A numeric evaluation parameter is outside its declared bounds
    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// min_difficulty > max_difficulty
    #[error("minimum difficulty {min} is greater than maximum difficulty {max}")]
    InvertedDifficulty { min: u8, max: u8 },

    /// Freeform model name left blank
    #[error("no model name given for provider '{provider}'")]
    EmptyModel { provider: String },

    /// Model not in the provider's allowed list
    #[error("model '{model}' is not available for provider '{provider}'")]
    UnknownModel { provider: String, model: String },

    /// Provider identifier not recognised
    #[error("unknown LLM provider '{0}'")]
    UnknownProvider(String),
}

impl ValidationError {
    pub(crate) fn out_of_range(
        field: &'static str,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Main error type for the controller
#[derive(Error, Debug, Clone)]
pub enum ScrimError {
    /// Operator input rejected
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Credential store missing or unparsable
    #[error("Credential store unavailable at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// Operation not allowed in the current session state
    #[error("Cannot start a run while the session is {state}")]
    InvalidState { state: String },

    /// The external engine raised or panicked
    #[error("Evaluation failed: {0}")]
    ExecutorFailure(String),

    /// No experiment output could be located
    #[error("No results found: {0}")]
    ResultsNotFound(String),

    /// Result table exists but a required cell could not be read
    #[error("Malformed results table: {0}")]
    MalformedResults(String),

    /// Settings file problems
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),
}

impl ScrimError {
    /// Create a store-unavailable error
    pub fn store_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a results-not-found error
    pub fn results_not_found(message: impl Into<String>) -> Self {
        Self::ResultsNotFound(message.into())
    }

    /// Create a malformed-results error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResults(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Whether the operator can carry on after seeing this error.
    ///
    /// Store, state, executor and results problems are shown as warnings;
    /// the session stays usable. Settings and IO errors usually mean the
    /// command itself cannot proceed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScrimError::Config(_) | ScrimError::Io(_))
    }

    /// Short actionable hint for the operator
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ScrimError::Validation(ValidationError::EmptyPrompt) => {
                Some("Provide an agent prompt with --prompt or --prompt-file")
            }
            ScrimError::Validation(_) => Some("Check the evaluation parameters and model name"),
            ScrimError::StoreUnavailable { .. } => Some("Run 'scrim keys setup' to create it"),
            ScrimError::InvalidState { .. } => Some("Reset the session before starting again"),
            ScrimError::ResultsNotFound(_) => {
                Some("The evaluation may still be running or may have failed")
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScrimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
