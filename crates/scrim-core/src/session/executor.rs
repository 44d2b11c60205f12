//! Simulation engine interface
//!
//! The engine is opaque: it accepts a run configuration and an output path
//! and leaves a result set on disk. Runs go through two blocking phases,
//! dataset loading and simulation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::RunConfiguration;

/// Name of the configuration snapshot written next to the engine output
pub const CONFIG_SNAPSHOT_FILE: &str = "run_config.yaml";

/// Lines of stderr kept in a failure message
const STDERR_TAIL_LINES: usize = 20;

/// Two-phase contract of the simulation engine
#[async_trait]
pub trait SimulationExecutor: Send + Sync {
    /// Generate or load the scenario dataset
    async fn load_dataset(&self, config: &RunConfiguration, output_path: &Path) -> Result<()>;

    /// Run every scenario against the agent and write results
    async fn run_simulation(&self, config: &RunConfiguration, output_path: &Path) -> Result<()>;
}

/// Engine phase, substituted for `{phase}` in process arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LoadDataset,
    RunSimulation,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::LoadDataset => "load_dataset",
            Phase::RunSimulation => "run_simulation",
        }
    }
}

/// How to launch the engine as a child process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// Program to spawn
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments; `{phase}`, `{config}` and `{output}` are substituted
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Working directory for the engine (defaults to the current one)
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

fn default_program() -> String {
    "python".to_string()
}

fn default_args() -> Vec<String> {
    [
        "run.py",
        "--phase",
        "{phase}",
        "--config_path",
        "{config}",
        "--output_path",
        "{output}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: None,
        }
    }
}

/// Runs the engine as a child process, once per phase
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    settings: ExecutorSettings,
}

impl ProcessExecutor {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Arguments for one phase with placeholders filled in
    pub fn render_args(&self, phase: Phase, config_path: &Path, output_path: &Path) -> Vec<String> {
        let config = config_path.display().to_string();
        let output = output_path.display().to_string();
        self.settings
            .args
            .iter()
            .map(|arg| {
                arg.replace("{phase}", phase.as_str())
                    .replace("{config}", &config)
                    .replace("{output}", &output)
            })
            .collect()
    }

    async fn write_snapshot(config: &RunConfiguration, output_path: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_path).await.with_context(|| {
            format!("Failed to create output directory {}", output_path.display())
        })?;

        let snapshot = output_path.join(CONFIG_SNAPSHOT_FILE);
        let yaml = config.to_yaml().context("Failed to serialize run configuration")?;
        tokio::fs::write(&snapshot, yaml)
            .await
            .with_context(|| format!("Failed to write {}", snapshot.display()))?;
        Ok(snapshot)
    }

    async fn invoke(&self, phase: Phase, config_path: &Path, output_path: &Path) -> Result<()> {
        let args = self.render_args(phase, config_path, output_path);
        info!(
            phase = phase.as_str(),
            program = %self.settings.program,
            "Invoking simulation engine"
        );

        let mut command = Command::new(&self.settings.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.settings.working_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .with_context(|| format!("Failed to launch '{}'", self.settings.program))?;

        debug!(
            phase = phase.as_str(),
            stdout_bytes = output.stdout.len(),
            "Engine phase finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}: {}",
                phase.as_str(),
                output.status,
                stderr_tail(&stderr)
            );
        }
        Ok(())
    }
}

#[async_trait]
impl SimulationExecutor for ProcessExecutor {
    async fn load_dataset(&self, config: &RunConfiguration, output_path: &Path) -> Result<()> {
        let output_path = absolute_output(output_path)?;
        let snapshot = Self::write_snapshot(config, &output_path).await?;
        self.invoke(Phase::LoadDataset, &snapshot, &output_path).await
    }

    async fn run_simulation(&self, config: &RunConfiguration, output_path: &Path) -> Result<()> {
        let output_path = absolute_output(output_path)?;
        let snapshot = output_path.join(CONFIG_SNAPSHOT_FILE);
        let snapshot = if snapshot.exists() {
            snapshot
        } else {
            Self::write_snapshot(config, &output_path).await?
        };
        self.invoke(Phase::RunSimulation, &snapshot, &output_path).await
    }
}

/// Resolve against the controller's working directory, not the engine's
fn absolute_output(output_path: &Path) -> Result<PathBuf> {
    std::path::absolute(output_path)
        .with_context(|| format!("Cannot resolve output path {}", output_path.display()))
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        "(no stderr output)".to_string()
    } else {
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args_substitutes_placeholders() {
        let executor = ProcessExecutor::new(ExecutorSettings::default());
        let args = executor.render_args(
            Phase::RunSimulation,
            Path::new("out/run_config.yaml"),
            Path::new("out"),
        );
        assert_eq!(
            args,
            vec![
                "run.py",
                "--phase",
                "run_simulation",
                "--config_path",
                "out/run_config.yaml",
                "--output_path",
                "out",
            ]
        );
    }

    #[test]
    fn test_settings_defaults_from_partial_json() {
        let settings: ExecutorSettings =
            serde_json::from_str(r#"{"program": "/opt/engine/bin/sim"}"#).unwrap();
        assert_eq!(settings.program, "/opt/engine/bin/sim");
        assert_eq!(settings.args, default_args());
        assert!(settings.working_dir.is_none());
    }

    #[test]
    fn test_absolute_output_resolves_relative_paths() {
        let resolved = absolute_output(Path::new("results/run")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::env::current_dir().unwrap().join("results/run"));

        let already = std::env::temp_dir().join("run");
        assert_eq!(absolute_output(&already).unwrap(), already);
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
        assert_eq!(stderr_tail(""), "(no stderr output)");
    }
}
