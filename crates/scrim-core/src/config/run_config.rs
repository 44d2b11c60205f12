//! Run configuration consumed by the simulation engine
//!
//! A typed rendition of the engine's nested configuration document. Field
//! names serialize to the keys the engine reads. The fixed operational
//! values live in [`defaults`] so that drift from the engine contract shows
//! up in review and in tests.

use serde::{Deserialize, Serialize};

use crate::provider::SharedSelection;

/// Fixed operational parameters of the engine contract
pub mod defaults {
    pub const POLICIES_WORKERS: u32 = 3;
    pub const POLICIES_TIMEOUT_SECS: u64 = 20;
    pub const EDGE_WORKERS: u32 = 5;
    pub const EDGE_TIMEOUT_SECS: u64 = 20;
    pub const DESCRIPTION_WORKERS: u32 = 3;
    pub const DESCRIPTION_TIMEOUT_SECS: u64 = 40;
    pub const REFINEMENT_WORKERS: u32 = 3;
    pub const REFINEMENT_TIMEOUT_SECS: u64 = 20;
    pub const DO_REFINEMENT: bool = false;

    pub const SYMBOLIC_ENRICHMENT_WORKERS: u32 = 3;
    pub const SYMBOLIC_ENRICHMENT_TIMEOUT_SECS: u64 = 40;
    pub const SYMBOLIC_CONSTRAINTS_WORKERS: u32 = 3;
    pub const SYMBOLIC_CONSTRAINTS_TIMEOUT_SECS: u64 = 40;
    pub const EVENT_GRAPH_WORKERS: u32 = 3;
    pub const EVENT_GRAPH_TIMEOUT_SECS: u64 = 180;

    pub const USER_PARSING_MODE: &str = "thought";
    pub const MEMORY_PATH: &str = "memory.db";
    pub const DIALOG_TIMEOUT_SECS: u64 = 200;
    pub const DIALOG_MINI_BATCH_SIZE: u32 = 10;
    pub const DIALOG_RECURSION_LIMIT: u32 = 35;

    pub const ANALYSIS_WORKERS: u32 = 3;
    pub const ANALYSIS_TIMEOUT_SECS: u64 = 20;

    pub const DATASET_NAME: &str = "dataset";
    pub const DATASET_MINI_BATCH_SIZE: u32 = 10;
    pub const DATASET_MAX_ITERATIONS: u32 = 100;
}

/// Prompt templates pulled from the engine's prompt hub
pub mod prompts {
    pub const TASK_EXTRACTION: &str = "eladlev/task_extraction";
    pub const FLOWS_EXTRACTION: &str = "eladlev/flows_extraction";
    pub const POLICIES_EXTRACTION: &str = "eladlev/policies_extraction";
    pub const POLICIES_GRAPH: &str = "eladlev/policies_graph";
    pub const DESCRIPTION_GENERATION: &str = "eladlev/description_generation:c7ecf9ea";
    pub const DESCRIPTION_REFINEMENT: &str = "eladlev/description_refinement";
    pub const REFINED_DESCRIPTION: &str = "eladlev/refined_description2";
    pub const EVENT_SYMBOLIC: &str = "eladlev/event_symbolic";
    pub const SYMBOLIC_CONSTRAINTS: &str = "eladlev/symbolic_prompt_constraints";
    pub const FILTER_RESTRICTIONS: &str = "eladlev/filter_restrictions";
    pub const EVENT_FINAL: &str = "eladlev/event_final";
    pub const EVENT_EXECUTOR: &str = "eladlev/event_executor";
    pub const USER_SIM: &str = "eladlev/user_sim";
    pub const END_CRITIQUE: &str = "eladlev/end_critique";
    pub const ANALYSIS_INFO: &str = "eladlev/analysis_info";
}

/// Reference to a prompt hub entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRef {
    pub prompt_hub_name: String,
}

impl PromptRef {
    pub fn hub(name: &str) -> Self {
        Self {
            prompt_hub_name: name.to_string(),
        }
    }
}

/// A prompt-driven stage with its worker pool and timeout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub prompt: PromptRef,
    pub num_workers: u32,
    pub timeout: u64,
}

impl StageConfig {
    pub fn new(prompt: &str, num_workers: u32, timeout: u64) -> Self {
        Self {
            prompt: PromptRef::hub(prompt),
            num_workers,
            timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptionConfig {
    pub llm: SharedSelection,
    pub extraction_prompt: PromptRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// System prompt of the agent under test
    pub prompt: String,
    pub tools_file: String,
    pub database_folder: String,
    pub database_validators: String,
    pub task_description: TaskDescriptionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    pub prompt: PromptRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementConfig {
    pub do_refinement: bool,
    pub prompt_feedback: PromptRef,
    pub prompt_refinement: PromptRef,
    pub num_workers: u32,
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionGeneratorConfig {
    pub flow_config: FlowConfig,
    pub policies_config: StageConfig,
    pub edge_config: StageConfig,
    pub description_config: StageConfig,
    pub refinement_config: RefinementConfig,
    pub llm_policy: SharedSelection,
    pub llm_edge: SharedSelection,
    pub llm_description: SharedSelection,
    pub llm_refinement: SharedSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGraphConfig {
    pub llm: SharedSelection,
    pub prompt_restrictions: PromptRef,
    pub prompt_final_res: PromptRef,
    pub prompt_executors: PromptRef,
    pub num_workers: u32,
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGeneratorConfig {
    pub symbolic_enrichment_config: StageConfig,
    pub symbolic_constraints_config: StageConfig,
    pub event_graph: EventGraphConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueConfig {
    pub prompt: PromptRef,
    pub llm: SharedSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogManagerConfig {
    pub user_parsing_mode: String,
    pub memory_path: String,
    pub user_prompt: PromptRef,
    pub critique_config: CritiqueConfig,
    pub llm_user: SharedSelection,
    pub llm_chat: SharedSelection,
    pub num_workers: u32,
    pub timeout: u64,
    pub mini_batch_size: u32,
    pub cost_limit: f64,
    pub recursion_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub prompt: PromptRef,
    pub llm: SharedSelection,
    pub num_workers: u32,
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    #[serde(rename = "min_difficult_level")]
    pub min_difficulty_level: u8,
    #[serde(rename = "max_difficult_level")]
    pub max_difficulty_level: u8,
    pub num_samples: u32,
    pub mini_batch_size: u32,
    pub max_iterations: u32,
    pub cost_limit: f64,
}

/// Complete input handed to the simulation engine for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub environment: EnvironmentConfig,
    pub description_generator: DescriptionGeneratorConfig,
    pub event_generator: EventGeneratorConfig,
    pub dialog_manager: DialogManagerConfig,
    pub analysis: AnalysisConfig,
    pub dataset: DatasetConfig,
}

impl RunConfiguration {
    /// Every place in the tree that consumes the LLM selection
    pub fn llm_injection_points(&self) -> Vec<(&'static str, &SharedSelection)> {
        vec![
            (
                "environment.task_description.llm",
                &self.environment.task_description.llm,
            ),
            (
                "description_generator.llm_policy",
                &self.description_generator.llm_policy,
            ),
            (
                "description_generator.llm_edge",
                &self.description_generator.llm_edge,
            ),
            (
                "description_generator.llm_description",
                &self.description_generator.llm_description,
            ),
            (
                "description_generator.llm_refinement",
                &self.description_generator.llm_refinement,
            ),
            (
                "event_generator.event_graph.llm",
                &self.event_generator.event_graph.llm,
            ),
            (
                "dialog_manager.critique_config.llm",
                &self.dialog_manager.critique_config.llm,
            ),
            ("dialog_manager.llm_user", &self.dialog_manager.llm_user),
            ("dialog_manager.llm_chat", &self.dialog_manager.llm_chat),
            ("analysis.llm", &self.analysis.llm),
        ]
    }

    /// The selection every injection point refers to
    pub fn llm(&self) -> &SharedSelection {
        &self.environment.task_description.llm
    }

    /// Render as the YAML document the engine reads
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
