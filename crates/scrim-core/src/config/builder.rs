//! Run configuration builder
//!
//! Turns the operator's loose inputs into a complete [`RunConfiguration`].

use tracing::debug;

use super::params::EvaluationParameters;
use super::run_config::{
    AnalysisConfig, CritiqueConfig, DatasetConfig, DescriptionGeneratorConfig,
    DialogManagerConfig, EnvironmentConfig, EventGeneratorConfig, EventGraphConfig, FlowConfig,
    PromptRef, RefinementConfig, RunConfiguration, StageConfig, TaskDescriptionConfig, defaults,
    prompts,
};
use crate::error::ValidationError;
use crate::provider::{ProviderRegistry, SharedSelection};

/// Builds run configurations. Pure: no IO, no clock.
pub struct ConfigBuilder;

impl ConfigBuilder {
    /// Build the configuration for one run.
    ///
    /// Every LLM consumer in the result holds a clone of `selection`, so all
    /// of them observe a later [`SharedSelection::replace`].
    pub fn build(
        prompt: &str,
        selection: &SharedSelection,
        params: &EvaluationParameters,
    ) -> Result<RunConfiguration, ValidationError> {
        if prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        params.validate()?;
        ProviderRegistry::validate(&selection.get())?;

        debug!(
            provider = %selection.provider(),
            model = %selection.model(),
            num_samples = params.num_samples,
            "Building run configuration"
        );

        let llm = || selection.clone();

        Ok(RunConfiguration {
            environment: EnvironmentConfig {
                prompt: prompt.to_string(),
                tools_file: String::new(),
                database_folder: String::new(),
                database_validators: String::new(),
                task_description: TaskDescriptionConfig {
                    llm: llm(),
                    extraction_prompt: PromptRef::hub(prompts::TASK_EXTRACTION),
                },
            },
            description_generator: DescriptionGeneratorConfig {
                flow_config: FlowConfig {
                    prompt: PromptRef::hub(prompts::FLOWS_EXTRACTION),
                },
                policies_config: StageConfig::new(
                    prompts::POLICIES_EXTRACTION,
                    defaults::POLICIES_WORKERS,
                    defaults::POLICIES_TIMEOUT_SECS,
                ),
                edge_config: StageConfig::new(
                    prompts::POLICIES_GRAPH,
                    defaults::EDGE_WORKERS,
                    defaults::EDGE_TIMEOUT_SECS,
                ),
                description_config: StageConfig::new(
                    prompts::DESCRIPTION_GENERATION,
                    defaults::DESCRIPTION_WORKERS,
                    defaults::DESCRIPTION_TIMEOUT_SECS,
                ),
                refinement_config: RefinementConfig {
                    do_refinement: defaults::DO_REFINEMENT,
                    prompt_feedback: PromptRef::hub(prompts::DESCRIPTION_REFINEMENT),
                    prompt_refinement: PromptRef::hub(prompts::REFINED_DESCRIPTION),
                    num_workers: defaults::REFINEMENT_WORKERS,
                    timeout: defaults::REFINEMENT_TIMEOUT_SECS,
                },
                llm_policy: llm(),
                llm_edge: llm(),
                llm_description: llm(),
                llm_refinement: llm(),
            },
            event_generator: EventGeneratorConfig {
                symbolic_enrichment_config: StageConfig::new(
                    prompts::EVENT_SYMBOLIC,
                    defaults::SYMBOLIC_ENRICHMENT_WORKERS,
                    defaults::SYMBOLIC_ENRICHMENT_TIMEOUT_SECS,
                ),
                symbolic_constraints_config: StageConfig::new(
                    prompts::SYMBOLIC_CONSTRAINTS,
                    defaults::SYMBOLIC_CONSTRAINTS_WORKERS,
                    defaults::SYMBOLIC_CONSTRAINTS_TIMEOUT_SECS,
                ),
                event_graph: EventGraphConfig {
                    llm: llm(),
                    prompt_restrictions: PromptRef::hub(prompts::FILTER_RESTRICTIONS),
                    prompt_final_res: PromptRef::hub(prompts::EVENT_FINAL),
                    prompt_executors: PromptRef::hub(prompts::EVENT_EXECUTOR),
                    num_workers: defaults::EVENT_GRAPH_WORKERS,
                    timeout: defaults::EVENT_GRAPH_TIMEOUT_SECS,
                },
            },
            dialog_manager: DialogManagerConfig {
                user_parsing_mode: defaults::USER_PARSING_MODE.to_string(),
                memory_path: defaults::MEMORY_PATH.to_string(),
                user_prompt: PromptRef::hub(prompts::USER_SIM),
                critique_config: CritiqueConfig {
                    prompt: PromptRef::hub(prompts::END_CRITIQUE),
                    llm: llm(),
                },
                llm_user: llm(),
                llm_chat: llm(),
                num_workers: params.num_workers,
                timeout: defaults::DIALOG_TIMEOUT_SECS,
                mini_batch_size: defaults::DIALOG_MINI_BATCH_SIZE,
                cost_limit: params.cost_limit,
                recursion_limit: defaults::DIALOG_RECURSION_LIMIT,
            },
            analysis: AnalysisConfig {
                prompt: PromptRef::hub(prompts::ANALYSIS_INFO),
                llm: llm(),
                num_workers: defaults::ANALYSIS_WORKERS,
                timeout: defaults::ANALYSIS_TIMEOUT_SECS,
            },
            dataset: DatasetConfig {
                name: defaults::DATASET_NAME.to_string(),
                min_difficulty_level: params.min_difficulty,
                max_difficulty_level: params.max_difficulty,
                num_samples: params.num_samples,
                mini_batch_size: defaults::DATASET_MINI_BATCH_SIZE,
                max_iterations: defaults::DATASET_MAX_ITERATIONS,
                cost_limit: params.cost_limit,
            },
        })
    }
}
