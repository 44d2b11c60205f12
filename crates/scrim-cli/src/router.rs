//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction, KeysAction};
use crate::commands;
use anyhow::Result;
use std::path::Path;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    let settings_path = cli.config_file.as_path();

    match cli.command {
        Commands::Run(args) => commands::run::execute(settings_path, args, cli.verbose).await,
        Commands::Results(args) => commands::results::show(args, cli.verbose).await,
        Commands::Providers { json } => commands::providers::list(json),
        Commands::Keys { action } => route_keys(settings_path, action),
        Commands::Doctor => commands::doctor::doctor(settings_path).await,
        Commands::Config { action } => route_config(settings_path, action).await,
    }
}

fn route_keys(settings_path: &Path, action: KeysAction) -> Result<()> {
    match action {
        KeysAction::Status => commands::keys::status(settings_path),
        KeysAction::Setup { provider } => commands::keys::setup(settings_path, provider),
    }
}

async fn route_config(settings_path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => commands::config::show(settings_path).await,
        ConfigAction::Validate => commands::config::validate(settings_path).await,
        ConfigAction::Init { force } => commands::config::init(settings_path, force).await,
    }
}
