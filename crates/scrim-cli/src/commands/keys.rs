//! Credential store commands

use crate::console::CliConsole;
use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};
use scrim_core::provider::AZURE_DEFAULT_API_VERSION;
use scrim_core::{CredentialStatus, CredentialStore, Provider, ProviderRegistry};
use std::path::Path;

/// Optional Azure field with a fallback value
const AZURE_API_VERSION_FIELD: &str = "OPENAI_API_VERSION";

/// Show which providers have every required key set
pub fn status(settings_path: &Path) -> Result<()> {
    let console = CliConsole::new(true);
    let settings = super::load_settings(settings_path)?;

    console.print_header("Credential Status");
    console.info(&format!("Store: {}", settings.credentials_path.display()));

    let report = match CredentialStatus::new(&settings.credentials_path).report() {
        Ok(report) => report,
        Err(e) => {
            console.warn(&e.to_string());
            if let Some(hint) = e.suggestion() {
                console.hint(hint);
            }
            return Ok(());
        }
    };

    for provider_status in &report.providers {
        let name = provider_status.provider.display_name();
        if provider_status.is_configured() {
            println!("{} {}", "✓".green().bold(), name);
        } else {
            println!(
                "{} {} {}",
                "✗".red().bold(),
                name,
                format!("(missing {})", provider_status.missing_fields().join(", ")).dimmed()
            );
        }
    }

    println!();
    let overall = report.overall();
    if overall.is_ready() {
        console.success(overall.description());
    } else {
        console.warn(overall.description());
        console.hint("Run 'scrim keys setup'");
    }
    Ok(())
}

/// Prompt for one provider's keys and write them to the store
pub fn setup(settings_path: &Path, provider: Option<Provider>) -> Result<()> {
    let console = CliConsole::new(true);
    if !console.is_interactive() {
        bail!("'scrim keys setup' needs an interactive terminal");
    }

    let settings = super::load_settings(settings_path)?;
    let mut store = CredentialStore::load_or_template(&settings.credentials_path)
        .context("Cannot update the credential store")?;

    console.print_header("API Key Setup");
    let provider = match provider {
        Some(provider) => provider,
        None => select_provider()?,
    };
    let section = provider.as_str();
    let theme = ColorfulTheme::default();

    for &field in ProviderRegistry::required_credential_fields(provider) {
        let existing = store.is_set(section, field);
        let prompt = if existing {
            format!("{} (leave empty to keep current)", field)
        } else {
            field.to_string()
        };

        let value = if field.ends_with("_KEY") {
            Password::with_theme(&theme)
                .with_prompt(prompt)
                .allow_empty_password(existing)
                .interact()?
        } else {
            Input::<String>::with_theme(&theme)
                .with_prompt(prompt)
                .allow_empty(existing)
                .interact_text()?
        };

        let value = value.trim();
        if !value.is_empty() {
            store.set(section, field, value);
        }
    }

    if provider == Provider::Azure {
        let current = store
            .value(section, AZURE_API_VERSION_FIELD)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(AZURE_DEFAULT_API_VERSION)
            .to_string();
        let version: String = Input::with_theme(&theme)
            .with_prompt(AZURE_API_VERSION_FIELD)
            .default(current)
            .interact_text()?;
        let version = version.trim();
        let version = if version.is_empty() {
            AZURE_DEFAULT_API_VERSION
        } else {
            version
        };
        store.set(section, AZURE_API_VERSION_FIELD, version);
    }

    store.save().context("Failed to write the credential store")?;
    console.success(&format!(
        "Saved {} credentials to {}",
        provider.display_name(),
        store.path().display()
    ));
    Ok(())
}

fn select_provider() -> Result<Provider> {
    let items: Vec<String> = Provider::ALL
        .iter()
        .map(|p| format!("{} ({})", p.display_name(), p.as_str()))
        .collect();

    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select the provider to configure")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(Provider::ALL[index])
}
