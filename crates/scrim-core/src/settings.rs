//! Operator settings
//!
//! Settings are resolved in this order (lowest to highest priority):
//!
//! 1. Built-in defaults
//! 2. Settings file (`scrim_config.json` unless another path is given)
//! 3. `SCRIM_*` environment variables
//! 4. Command-line flags, applied by the caller

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EvaluationParameters;
use crate::credentials::DEFAULT_CREDENTIALS_PATH;
use crate::error::{ScrimError, ScrimResult};
use crate::provider::{LlmSelection, Provider, ProviderRegistry};
use crate::session::ExecutorSettings;

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "scrim_config.json";

/// Default root under which run output directories are created
pub const DEFAULT_RESULTS_ROOT: &str = "results";

pub const ENV_CREDENTIALS_PATH: &str = "SCRIM_CREDENTIALS_PATH";
pub const ENV_RESULTS_ROOT: &str = "SCRIM_RESULTS_ROOT";
pub const ENV_PROVIDER: &str = "SCRIM_PROVIDER";
pub const ENV_MODEL: &str = "SCRIM_MODEL";
pub const ENV_EXECUTOR_PROGRAM: &str = "SCRIM_EXECUTOR_PROGRAM";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrimSettings {
    /// Credential store file
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Where new run output directories are created
    #[serde(default = "default_results_root")]
    pub results_root: PathBuf,

    #[serde(default = "default_provider")]
    pub default_provider: Provider,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub evaluation: EvaluationParameters,

    #[serde(default)]
    pub executor: ExecutorSettings,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_PATH)
}

fn default_results_root() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_ROOT)
}

fn default_provider() -> Provider {
    Provider::OpenAi
}

fn default_model() -> String {
    ProviderRegistry::default_model(Provider::OpenAi).to_string()
}

impl Default for ScrimSettings {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            results_root: default_results_root(),
            default_provider: default_provider(),
            default_model: default_model(),
            evaluation: EvaluationParameters::default(),
            executor: ExecutorSettings::default(),
        }
    }
}

impl ScrimSettings {
    /// Load from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> ScrimResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ScrimError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ScrimError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from file, then apply `SCRIM_*` environment overrides
    pub fn resolve(path: &Path) -> ScrimResult<Self> {
        let mut settings = Self::load(path)?;
        settings.apply_env_with(|key| env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ScrimResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CREDENTIALS_PATH) {
            self.credentials_path = PathBuf::from(path);
        }
        if let Some(root) = lookup(ENV_RESULTS_ROOT) {
            self.results_root = PathBuf::from(root);
        }
        if let Some(provider) = lookup(ENV_PROVIDER) {
            let provider: Provider = provider
                .parse()
                .map_err(|e| ScrimError::config(format!("Invalid {}: {}", ENV_PROVIDER, e)))?;
            // A provider switch without a model picks that provider's default
            if provider != self.default_provider && lookup(ENV_MODEL).is_none() {
                self.default_model = ProviderRegistry::default_model(provider).to_string();
            }
            self.default_provider = provider;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.default_model = model;
        }
        if let Some(program) = lookup(ENV_EXECUTOR_PROGRAM) {
            self.executor.program = program;
        }
        Ok(())
    }

    pub fn default_selection(&self) -> LlmSelection {
        LlmSelection::new(self.default_provider, self.default_model.clone())
    }

    /// Check the evaluation defaults and the default model
    pub fn validate(&self) -> ScrimResult<()> {
        self.evaluation.validate()?;
        ProviderRegistry::validate(&self.default_selection())?;
        if self.executor.program.trim().is_empty() {
            return Err(ScrimError::config("executor.program is empty"));
        }
        Ok(())
    }

    pub fn to_json(&self) -> ScrimResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScrimError::config(format!("Failed to serialize settings: {}", e)))
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> ScrimResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = ScrimSettings::load(&temp_dir.path().join("absent.json")).unwrap();

        assert_eq!(settings, ScrimSettings::default());
        assert_eq!(settings.credentials_path, PathBuf::from("config/llm_env.yml"));
        assert_eq!(settings.default_model, "gpt-4o");
        assert_eq!(settings.evaluation.num_samples, 20);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scrim_config.json");
        fs::write(
            &path,
            r#"{"default_provider": "anthropic", "default_model": "claude-3-haiku-20240307",
                "evaluation": {"num_samples": 50}}"#,
        )
        .unwrap();

        let settings = ScrimSettings::load(&path).unwrap();
        assert_eq!(settings.default_provider, Provider::Anthropic);
        assert_eq!(settings.evaluation.num_samples, 50);
        assert_eq!(settings.evaluation.cost_limit, 5.0);
        assert_eq!(settings.results_root, PathBuf::from("results"));
        settings.validate().unwrap();
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scrim_config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(ScrimSettings::load(&path), Err(ScrimError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = ScrimSettings::default();
        settings
            .apply_env_with(lookup(&[
                (ENV_RESULTS_ROOT, "/data/runs"),
                (ENV_PROVIDER, "google"),
                (ENV_EXECUTOR_PROGRAM, "/opt/engine/sim"),
            ]))
            .unwrap();

        assert_eq!(settings.results_root, PathBuf::from("/data/runs"));
        assert_eq!(settings.default_provider, Provider::Google);
        assert_eq!(settings.default_model, "gemini-1.5-pro");
        assert_eq!(settings.executor.program, "/opt/engine/sim");
    }

    #[test]
    fn test_env_model_wins_over_provider_default() {
        let mut settings = ScrimSettings::default();
        settings
            .apply_env_with(lookup(&[(ENV_PROVIDER, "openai"), (ENV_MODEL, "gpt-4o-mini")]))
            .unwrap();
        assert_eq!(settings.default_model, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_env_provider() {
        let mut settings = ScrimSettings::default();
        let err = settings
            .apply_env_with(lookup(&[(ENV_PROVIDER, "cohere")]))
            .unwrap_err();
        assert!(matches!(err, ScrimError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_evaluation_defaults() {
        let mut settings = ScrimSettings::default();
        settings.evaluation.num_workers = 0;
        assert!(matches!(settings.validate(), Err(ScrimError::Validation(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("scrim_config.json");
        let mut settings = ScrimSettings::default();
        settings.default_model = "gpt-4-turbo".to_string();

        settings.save(&path).unwrap();
        assert_eq!(ScrimSettings::load(&path).unwrap(), settings);
    }
}
