//! Environment health checks
//!
//! Each check yields a [`CheckResult`]; none of them fail hard.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::credentials::{CredentialStatus, CredentialStore};
use crate::error::ScrimError;
use crate::settings::ScrimSettings;

const PROBE_FILE: &str = ".scrim_write_probe";

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            message: message.into(),
            hint: None,
        }
    }

    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warn,
            message: message.into(),
            hint: None,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fail,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Results of a full health run
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    pub checks: Vec<CheckResult>,
}

impl HealthReport {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(CheckStatus::Fail) > 0
    }
}

/// Run every check against `settings`, loaded from `settings_path`
pub fn run_all(settings: &ScrimSettings, settings_path: &Path) -> HealthReport {
    let mut checks = vec![check_credential_store(&settings.credentials_path)];
    checks.extend(check_providers(&settings.credentials_path));
    checks.push(check_settings_file(settings_path));
    checks.push(check_writable("Results Directory", &settings.results_root));

    let credentials_dir = settings
        .credentials_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    checks.push(check_writable("Credentials Directory", credentials_dir));

    checks.push(check_executor_program(&settings.executor.program));
    HealthReport { checks }
}

/// Credential store exists and is valid YAML
pub fn check_credential_store(path: &Path) -> CheckResult {
    match CredentialStore::load(path) {
        Ok(_) => CheckResult::pass("Credential Store", format!("Valid: {}", path.display())),
        Err(ScrimError::StoreUnavailable { reason, .. }) if !path.exists() => {
            CheckResult::fail("Credential Store", format!("{}: {}", path.display(), reason))
                .with_hint("Run 'scrim keys setup' to create it")
        }
        Err(e) => CheckResult::fail("Credential Store", e.to_string())
            .with_hint("Check the file for YAML syntax errors"),
    }
}

/// One line per provider plus an overall line
pub fn check_providers(credentials_path: &Path) -> Vec<CheckResult> {
    let report = match CredentialStatus::new(credentials_path).report() {
        Ok(report) => report,
        // Already reported by the store check
        Err(_) => return Vec::new(),
    };

    let mut results: Vec<CheckResult> = report
        .providers
        .iter()
        .map(|status| {
            let name = format!("{} Key", status.provider.display_name());
            if status.is_configured() {
                CheckResult::pass(name, "Configured")
            } else {
                CheckResult::warn(
                    name,
                    format!("Missing {}", status.missing_fields().join(", ")),
                )
            }
        })
        .collect();

    let configured = report.configured();
    if configured.is_empty() {
        results.push(
            CheckResult::fail("Providers", "No provider configured")
                .with_hint("Run 'scrim keys setup'"),
        );
    } else {
        results.push(CheckResult::pass(
            "Providers",
            format!("{} provider(s) configured", configured.len()),
        ));
    }
    results
}

/// Settings file parses, or is absent and defaults apply
pub fn check_settings_file(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::warn("Settings File", format!("Not found: {}", path.display()))
            .with_hint("Run 'scrim config init' to create one; defaults are in use");
    }
    match ScrimSettings::load(path).and_then(|s| s.validate().map(|_| s)) {
        Ok(_) => CheckResult::pass("Settings File", format!("Valid: {}", path.display())),
        Err(e) => CheckResult::fail("Settings File", e.to_string())
            .with_hint("Run 'scrim config validate' for details"),
    }
}

/// Directory can be created and written to
pub fn check_writable(name: &str, dir: &Path) -> CheckResult {
    let probe = dir.join(PROBE_FILE);
    let outcome = fs::create_dir_all(dir)
        .and_then(|_| fs::write(&probe, b"ok"))
        .and_then(|_| fs::remove_file(&probe));

    match outcome {
        Ok(()) => CheckResult::pass(name, format!("{} (writable)", dir.display())),
        Err(e) => CheckResult::fail(name, format!("{} (not writable: {})", dir.display(), e)),
    }
}

/// Engine program exists at its path or on `PATH`
pub fn check_executor_program(program: &str) -> CheckResult {
    match resolve_program(program) {
        Some(path) => CheckResult::pass("Executor", path.display().to_string()),
        None => CheckResult::fail("Executor", format!("'{}' not found", program))
            .with_hint("Set executor.program in scrim_config.json or SCRIM_EXECUTOR_PROGRAM"),
    }
}

fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
