//! Credential status reporting
//!
//! Derives, per provider, whether the fields a run needs are populated. The
//! store is re-read on every check; nothing is cached.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::store::CredentialStore;
use crate::error::ScrimResult;
use crate::provider::{Provider, ProviderRegistry};

/// Presence of one required credential field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub provider: Provider,
    pub field_name: String,
    pub is_present: bool,
}

/// Overall state of the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigStatus {
    /// Every selectable provider is configured
    Complete,
    /// At least one provider is configured
    Partial,
    /// No provider is configured
    Unconfigured,
}

impl ConfigStatus {
    /// At least one provider can be used
    pub fn is_ready(&self) -> bool {
        matches!(self, ConfigStatus::Complete | ConfigStatus::Partial)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfigStatus::Complete => "All providers configured",
            ConfigStatus::Partial => "Some providers configured",
            ConfigStatus::Unconfigured => "No API keys configured",
        }
    }
}

impl fmt::Display for ConfigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Status of one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    pub entries: Vec<CredentialEntry>,
}

impl ProviderStatus {
    /// Every required field is present and non-empty
    pub fn is_configured(&self) -> bool {
        is_configured(&self.entries)
    }

    /// Required fields still missing
    pub fn missing_fields(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_present)
            .map(|e| e.field_name.as_str())
            .collect()
    }
}

/// Status of every selectable provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialReport {
    pub providers: Vec<ProviderStatus>,
}

impl CredentialReport {
    pub fn configured(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.provider)
            .collect()
    }

    pub fn overall(&self) -> ConfigStatus {
        let configured = self.configured().len();
        if configured == 0 {
            ConfigStatus::Unconfigured
        } else if configured == self.providers.len() {
            ConfigStatus::Complete
        } else {
            ConfigStatus::Partial
        }
    }
}

/// A provider counts as configured iff every required entry is present
pub fn is_configured(entries: &[CredentialEntry]) -> bool {
    !entries.is_empty() && entries.iter().all(|e| e.is_present)
}

/// Reads the credential store and reports which required fields are set
#[derive(Debug, Clone)]
pub struct CredentialStatus {
    store_path: PathBuf,
}

impl CredentialStatus {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Required-field presence for one provider.
    ///
    /// Fails with `StoreUnavailable` when the store is missing or corrupt; a
    /// store that lacks the provider's section reports every field absent.
    pub fn check(&self, provider: Provider) -> ScrimResult<Vec<CredentialEntry>> {
        let store = CredentialStore::load(&self.store_path)?;
        Ok(entries_for(&store, provider))
    }

    /// Status of every selectable provider from a single read of the store
    pub fn report(&self) -> ScrimResult<CredentialReport> {
        let store = CredentialStore::load(&self.store_path)?;
        let providers = Provider::ALL
            .iter()
            .map(|&provider| ProviderStatus {
                provider,
                entries: entries_for(&store, provider),
            })
            .collect();
        Ok(CredentialReport { providers })
    }
}

fn entries_for(store: &CredentialStore, provider: Provider) -> Vec<CredentialEntry> {
    ProviderRegistry::required_credential_fields(provider)
        .iter()
        .map(|field| CredentialEntry {
            provider,
            field_name: field.to_string(),
            is_present: store.is_set(provider.as_str(), field),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrimError;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(content: &str) -> (TempDir, CredentialStatus) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm_env.yml");
        fs::write(&path, content).unwrap();
        (dir, CredentialStatus::new(path))
    }

    #[test]
    fn test_missing_provider_section_reports_absent() {
        let (_dir, status) = store_with("google:\n  GOOGLE_API_KEY: abc\n");
        let entries = status.check(Provider::OpenAi).unwrap();

        assert_eq!(
            entries,
            vec![CredentialEntry {
                provider: Provider::OpenAi,
                field_name: "OPENAI_API_KEY".to_string(),
                is_present: false,
            }]
        );
        assert!(!is_configured(&entries));
    }

    #[test]
    fn test_blank_value_is_not_present() {
        let (_dir, status) = store_with("openai:\n  OPENAI_API_KEY: '  '\n");
        let entries = status.check(Provider::OpenAi).unwrap();
        assert!(!entries[0].is_present);
    }

    #[test]
    fn test_azure_needs_key_and_endpoint() {
        let (_dir, status) = store_with(
            "azure:\n  AZURE_OPENAI_API_KEY: k\n  AZURE_OPENAI_ENDPOINT: ''\n",
        );
        let entries = status.check(Provider::Azure).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!is_configured(&entries));

        let (_dir, status) = store_with(
            "azure:\n  AZURE_OPENAI_API_KEY: k\n  AZURE_OPENAI_ENDPOINT: https://x\n",
        );
        assert!(is_configured(&status.check(Provider::Azure).unwrap()));
    }

    #[test]
    fn test_missing_store_propagates() {
        let dir = TempDir::new().unwrap();
        let status = CredentialStatus::new(dir.path().join("absent.yml"));
        assert!(matches!(
            status.check(Provider::OpenAi),
            Err(ScrimError::StoreUnavailable { .. })
        ));
    }

    #[test]
    fn test_report_overall_status() {
        let (_dir, status) = store_with("openai:\n  OPENAI_API_KEY: sk\n");
        let report = status.report().unwrap();
        assert_eq!(report.configured(), vec![Provider::OpenAi]);
        assert_eq!(report.overall(), ConfigStatus::Partial);

        let (_dir, status) = store_with("{}\n");
        assert_eq!(status.report().unwrap().overall(), ConfigStatus::Unconfigured);

        let (_dir, status) = store_with(
            "openai: {OPENAI_API_KEY: a}\nazure: {AZURE_OPENAI_API_KEY: b, AZURE_OPENAI_ENDPOINT: c}\nanthropic: {ANTHROPIC_KEY: d}\ngoogle: {GOOGLE_API_KEY: e}\n",
        );
        let report = status.report().unwrap();
        assert_eq!(report.overall(), ConfigStatus::Complete);
        assert!(report.overall().is_ready());
    }
}
