//! Run configuration
//!
//! Evaluation parameters, the typed configuration tree the engine consumes,
//! and the builder that joins them.

mod builder;
mod params;
mod run_config;

pub use builder::ConfigBuilder;
pub use params::{
    COST_LIMIT_RANGE, DIFFICULTY_RANGE, EvaluationParameters, NUM_SAMPLES_RANGE,
    NUM_WORKERS_RANGE,
};
pub use run_config::{
    AnalysisConfig, CritiqueConfig, DatasetConfig, DescriptionGeneratorConfig,
    DialogManagerConfig, EnvironmentConfig, EventGeneratorConfig, EventGraphConfig, FlowConfig,
    PromptRef, RefinementConfig, RunConfiguration, StageConfig, TaskDescriptionConfig, defaults,
    prompts,
};
