//! Credential store file
//!
//! A YAML mapping of store section (usually a provider id) to a flat mapping
//! of credential field names to string values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{ScrimError, ScrimResult};
use crate::provider::CREDENTIAL_TEMPLATE;

/// Default location of the store, relative to the working directory
pub const DEFAULT_CREDENTIALS_PATH: &str = "config/llm_env.yml";

type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory copy of the credential store
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialStore {
    path: PathBuf,
    sections: Sections,
}

impl CredentialStore {
    /// Read the store.
    ///
    /// A missing file, unreadable file, or a document that is not a mapping
    /// of mappings is reported as `StoreUnavailable`. An empty document is
    /// an empty store.
    pub fn load(path: impl AsRef<Path>) -> ScrimResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScrimError::store_unavailable(path, "file not found"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ScrimError::store_unavailable(path, format!("cannot read: {}", e)))?;
        let document: Value = serde_yaml::from_str(&content)
            .map_err(|e| ScrimError::store_unavailable(path, format!("invalid YAML: {}", e)))?;

        let sections = parse_sections(document)
            .map_err(|reason| ScrimError::store_unavailable(path, reason))?;

        debug!(path = %path.display(), sections = sections.len(), "Loaded credential store");
        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Read the store, or start from the template when the file does not exist yet
    pub fn load_or_template(path: impl AsRef<Path>) -> ScrimResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::template(path))
        }
    }

    /// Store with every known section and field present and empty
    pub fn template(path: impl Into<PathBuf>) -> Self {
        let sections = CREDENTIAL_TEMPLATE
            .iter()
            .map(|(section, fields)| {
                let fields = fields
                    .iter()
                    .map(|field| (field.to_string(), String::new()))
                    .collect();
                (section.to_string(), fields)
            })
            .collect();

        Self {
            path: path.into(),
            sections,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Value of a field, `None` when absent
    pub fn value(&self, section: &str, field: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// Whether a field is present with a non-blank value
    pub fn is_set(&self, section: &str, field: &str) -> bool {
        self.value(section, field)
            .is_some_and(|value| !value.trim().is_empty())
    }

    /// Set a field, creating the section if needed
    pub fn set(&mut self, section: &str, field: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }

    /// Write the store back to its path
    pub fn save(&self) -> ScrimResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScrimError::io(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let yaml = serde_yaml::to_string(&self.sections)
            .map_err(|e| ScrimError::io(format!("Failed to serialize credential store: {}", e)))?;
        fs::write(&self.path, yaml).map_err(|e| {
            ScrimError::io(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), "Saved credential store");
        Ok(())
    }
}

fn parse_sections(document: Value) -> Result<Sections, String> {
    let mapping = match document {
        Value::Null => return Ok(Sections::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err("top level is not a mapping".to_string()),
    };

    let mut sections = Sections::new();
    for (key, value) in mapping {
        let section = scalar_to_string(&key)
            .ok_or_else(|| "section names must be scalars".to_string())?;

        let fields = match value {
            Value::Null => BTreeMap::new(),
            Value::Mapping(fields) => {
                let mut parsed = BTreeMap::new();
                for (field, value) in fields {
                    let field = scalar_to_string(&field).ok_or_else(|| {
                        format!("field names in '{}' must be scalars", section)
                    })?;
                    let value = match &value {
                        Value::Null => String::new(),
                        other => scalar_to_string(other).ok_or_else(|| {
                            format!("value of {}.{} is not a scalar", section, field)
                        })?,
                    };
                    parsed.insert(field, value);
                }
                parsed
            }
            _ => {
                warn!(section = %section, "Credential section is not a mapping");
                return Err(format!("section '{}' is not a mapping", section));
            }
        };
        sections.insert(section, fields);
    }
    Ok(sections)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
