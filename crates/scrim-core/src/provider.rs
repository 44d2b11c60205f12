//! LLM provider registry
//!
//! Static table of the providers an evaluation can run against, the models
//! the operator may pick for each, and the credential fields each one needs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Provider selectable for an evaluation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Azure,
    Anthropic,
    Google,
}

impl Provider {
    /// All selectable providers, in menu order
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Azure,
        Provider::Anthropic,
        Provider::Google,
    ];

    /// Identifier used in run configurations and the credential store
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Azure => "azure",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Azure => "Azure OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Google => "Google (Gemini)",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "azure" => Ok(Provider::Azure),
            "anthropic" => Ok(Provider::Anthropic),
            "google" | "gemini" => Ok(Provider::Google),
            other => Err(ValidationError::UnknownProvider(other.to_string())),
        }
    }
}

/// Suggested deployment name for Azure, whose model field is freeform
pub const AZURE_DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// API version written to the store when the operator leaves it blank
pub const AZURE_DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Every section of the credential store with the fields it holds.
///
/// Includes store-only sections (`anthropic_vertex`, `oracle`) that are not
/// selectable for a run but are scaffolded alongside the others.
pub const CREDENTIAL_TEMPLATE: &[(&str, &[&str])] = &[
    (
        "openai",
        &["OPENAI_API_KEY", "OPENAI_API_BASE", "OPENAI_ORGANIZATION"],
    ),
    (
        "azure",
        &[
            "AZURE_OPENAI_API_KEY",
            "AZURE_OPENAI_ENDPOINT",
            "OPENAI_API_VERSION",
        ],
    ),
    ("google", &["GOOGLE_API_KEY"]),
    ("anthropic_vertex", &["PROJECT_ID", "REGION"]),
    ("anthropic", &["ANTHROPIC_KEY"]),
    ("oracle", &["SERVICE_ENDPOINT", "COMPARTMENT_ID"]),
];

/// Static provider lookups
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Allowed model names in menu order. Empty means freeform text.
    pub fn models_for(provider: Provider) -> &'static [&'static str] {
        match provider {
            Provider::OpenAi => &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"],
            Provider::Azure => &[],
            Provider::Anthropic => &[
                "claude-3-5-sonnet-20241022",
                "claude-3-opus-20240229",
                "claude-3-haiku-20240307",
            ],
            Provider::Google => &["gemini-1.5-pro", "gemini-1.5-flash"],
        }
    }

    /// Fields that must be present and non-empty for the provider to count as configured
    pub fn required_credential_fields(provider: Provider) -> &'static [&'static str] {
        match provider {
            Provider::OpenAi => &["OPENAI_API_KEY"],
            Provider::Azure => &["AZURE_OPENAI_API_KEY", "AZURE_OPENAI_ENDPOINT"],
            Provider::Anthropic => &["ANTHROPIC_KEY"],
            Provider::Google => &["GOOGLE_API_KEY"],
        }
    }

    /// Whether the model field accepts any non-empty deployment name
    pub fn is_freeform(provider: Provider) -> bool {
        Self::models_for(provider).is_empty()
    }

    /// Model preselected in menus
    pub fn default_model(provider: Provider) -> &'static str {
        Self::models_for(provider)
            .first()
            .copied()
            .unwrap_or(AZURE_DEFAULT_DEPLOYMENT)
    }

    /// Check a selection against the provider's allowed set
    pub fn validate(selection: &LlmSelection) -> Result<(), ValidationError> {
        let model = selection.model.trim();
        if model.is_empty() {
            return Err(ValidationError::EmptyModel {
                provider: selection.provider.to_string(),
            });
        }
        if Self::is_freeform(selection.provider) {
            return Ok(());
        }
        if Self::models_for(selection.provider).contains(&model) {
            Ok(())
        } else {
            Err(ValidationError::UnknownModel {
                provider: selection.provider.to_string(),
                model: selection.model.clone(),
            })
        }
    }
}

/// Provider and model chosen by the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmSelection {
    #[serde(rename = "type")]
    pub provider: Provider,
    #[serde(rename = "name")]
    pub model: String,
}

impl LlmSelection {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Selection using the provider's default model
    pub fn with_default_model(provider: Provider) -> Self {
        Self::new(provider, ProviderRegistry::default_model(provider))
    }
}

/// A single LLM selection referenced from every consumer in a run configuration.
///
/// Clones share the same underlying selection, so replacing it through any
/// handle is visible at every injection point. Sharing is an in-memory
/// property; a deserialized configuration gets independent handles.
#[derive(Debug, Clone)]
pub struct SharedSelection(Arc<RwLock<LlmSelection>>);

impl SharedSelection {
    pub fn new(selection: LlmSelection) -> Self {
        Self(Arc::new(RwLock::new(selection)))
    }

    /// Snapshot of the current selection
    pub fn get(&self) -> LlmSelection {
        self.0.read().clone()
    }

    pub fn provider(&self) -> Provider {
        self.0.read().provider
    }

    pub fn model(&self) -> String {
        self.0.read().model.clone()
    }

    /// Swap in a new selection after validating it. Returns the previous one.
    pub fn replace(&self, selection: LlmSelection) -> Result<LlmSelection, ValidationError> {
        ProviderRegistry::validate(&selection)?;
        Ok(std::mem::replace(&mut *self.0.write(), selection))
    }

    /// Whether both handles point at the same selection
    pub fn ptr_eq(&self, other: &SharedSelection) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<LlmSelection> for SharedSelection {
    fn from(selection: LlmSelection) -> Self {
        Self::new(selection)
    }
}

impl PartialEq for SharedSelection {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

impl Serialize for SharedSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SharedSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        LlmSelection::deserialize(deserializer).map(SharedSelection::new)
    }
}
