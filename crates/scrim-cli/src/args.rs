//! CLI argument definitions using clap
//!
//! - scrim run --prompt-file agent.md     # Configure and launch an evaluation
//! - scrim results <output>               # Inspect the latest experiment
//! - scrim keys status|setup              # Credential store maintenance
//! - scrim providers / doctor / config    # Utility commands

use clap::{Args, Parser, Subcommand, ValueEnum};
use scrim_core::Provider;
use scrim_core::results::ScoreFilter;
use scrim_core::settings::DEFAULT_SETTINGS_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrim")]
#[command(about = "Scrim - configure, launch and inspect agent evaluation sessions")]
#[command(
    long_about = r#"Scrim - configure, launch and inspect agent evaluation sessions

USAGE:
  scrim run --prompt-file agent.md       # Run an evaluation
  scrim run --prompt "..." --dry-run     # Print the run configuration only
  scrim results results/evaluation_...   # Show and filter results
  scrim keys setup                       # Store provider API keys

UTILITY COMMANDS:
  scrim providers                        # List providers and models
  scrim doctor                           # Check the environment
  scrim config init                      # Create a settings file

For detailed help: scrim <command> --help"#
)]
#[command(version)]
pub struct Cli {
    /// Path to the settings file
    #[arg(long, global = true, env = "SCRIM_CONFIG", default_value = DEFAULT_SETTINGS_FILE)]
    pub config_file: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a run configuration and launch the simulation engine
    Run(RunArgs),

    /// Show summary and filtered results of the latest experiment
    Results(ResultsArgs),

    /// List selectable providers, their models and required credentials
    Providers {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or edit the credential store
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Check credentials, settings, directories and the engine program
    Doctor,

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// File holding the agent's system prompt (.txt or .md)
    #[arg(long, conflicts_with = "prompt", required_unless_present = "prompt")]
    pub prompt_file: Option<PathBuf>,

    /// Agent system prompt given inline
    #[arg(long)]
    pub prompt: Option<String>,

    /// LLM provider (openai, azure, anthropic, google)
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Model name, or deployment name for azure
    #[arg(long)]
    pub model: Option<String>,

    /// Number of scenarios to generate (5-200)
    #[arg(long)]
    pub num_samples: Option<u32>,

    /// Cost ceiling in USD (1-50)
    #[arg(long)]
    pub cost_limit: Option<f64>,

    /// Parallel dialog workers (1-10)
    #[arg(long)]
    pub num_workers: Option<u32>,

    /// Lowest scenario difficulty (1-10)
    #[arg(long)]
    pub min_difficulty: Option<u8>,

    /// Highest scenario difficulty (1-10)
    #[arg(long)]
    pub max_difficulty: Option<u8>,

    /// Output directory (default: <results_root>/evaluation_<timestamp>)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the run configuration as YAML and exit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ResultsArgs {
    /// Output directory of a previous run
    pub path: PathBuf,

    /// Keep only this outcome (all, success, failure, error)
    #[arg(long, default_value = "all")]
    pub filter: ScoreFilter,

    /// Minimum challenge level (default: lowest present)
    #[arg(long)]
    pub min_challenge: Option<i64>,

    /// Report format
    #[arg(long, default_value = "table", value_parser = ["table", "markdown", "md", "json"])]
    pub format: String,

    /// Write the filtered rows as CSV (default name: evaluation_results_<timestamp>.csv)
    #[arg(long)]
    pub export: Option<Option<PathBuf>>,
}

#[derive(Subcommand, Clone)]
pub enum KeysAction {
    /// Show which providers have their required keys set
    Status,

    /// Enter API keys for a provider
    Setup {
        /// Provider to configure (prompted when omitted)
        #[arg(long)]
        provider: Option<Provider>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Display current settings
    Show,

    /// Validate the settings file
    Validate,

    /// Create a settings file with defaults
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_requires_a_prompt_source() {
        assert!(Cli::try_parse_from(["scrim", "run"]).is_err());
        assert!(
            Cli::try_parse_from(["scrim", "run", "--prompt", "x", "--prompt-file", "a.md"])
                .is_err()
        );
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "scrim",
            "run",
            "--prompt",
            "You are a bank agent",
            "--provider",
            "anthropic",
            "--num-samples",
            "50",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.provider, Some(Provider::Anthropic));
        assert_eq!(args.num_samples, Some(50));
        assert!(args.dry_run);
    }

    #[test]
    fn test_results_export_flag() {
        let cli = Cli::try_parse_from(["scrim", "results", "out", "--export"]).unwrap();
        let Commands::Results(args) = cli.command else {
            panic!("expected results");
        };
        assert_eq!(args.export, Some(None));
        assert_eq!(args.filter, ScoreFilter::All);

        let cli = Cli::try_parse_from([
            "scrim", "results", "out", "--filter", "error", "--export", "errs.csv",
        ])
        .unwrap();
        let Commands::Results(args) = cli.command else {
            panic!("expected results");
        };
        assert_eq!(args.filter, ScoreFilter::Error);
        assert_eq!(args.export, Some(Some(PathBuf::from("errs.csv"))));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(Cli::try_parse_from(["scrim", "keys", "setup", "--provider", "cohere"]).is_err());
    }
}
