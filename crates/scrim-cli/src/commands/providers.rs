//! Providers command

use anyhow::Result;
use colored::*;
use scrim_core::{Provider, ProviderRegistry};
use serde::Serialize;

#[derive(Serialize)]
struct ProviderInfo {
    id: &'static str,
    name: &'static str,
    freeform_model: bool,
    default_model: &'static str,
    models: &'static [&'static str],
    required_credentials: &'static [&'static str],
}

fn provider_info(provider: Provider) -> ProviderInfo {
    ProviderInfo {
        id: provider.as_str(),
        name: provider.display_name(),
        freeform_model: ProviderRegistry::is_freeform(provider),
        default_model: ProviderRegistry::default_model(provider),
        models: ProviderRegistry::models_for(provider),
        required_credentials: ProviderRegistry::required_credential_fields(provider),
    }
}

/// List selectable providers
pub fn list(json: bool) -> Result<()> {
    let providers: Vec<ProviderInfo> = Provider::ALL.iter().map(|&p| provider_info(p)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    println!();
    println!("{}", "Providers".bold().underline());
    println!();
    for info in &providers {
        println!("{} ({})", info.name.bold(), info.id.cyan());
        if info.freeform_model {
            println!(
                "  Models:      any deployment name (default {})",
                info.default_model
            );
        } else {
            println!("  Models:      {}", info.models.join(", "));
        }
        println!(
            "  Credentials: {}",
            info.required_credentials.join(", ").dimmed()
        );
        println!();
    }
    Ok(())
}
