//! Integration tests for the run lifecycle
//!
//! Drives a session through the orchestrator with a scripted engine and reads
//! back what the engine left on disk.

use std::fs;
use std::path::Path;

use anyhow::bail;
use async_trait::async_trait;
use parking_lot::Mutex;
use scrim_core::{
    ConfigBuilder, EvaluationParameters, LlmSelection, Provider, ResultsAggregator,
    RunConfiguration, RunSession, RunState, ScrimError, SessionOrchestrator, SharedSelection,
    SimulationExecutor,
};
use tempfile::TempDir;

/// What the scripted engine does in each phase
#[derive(Clone, Copy)]
enum Script {
    Succeed,
    FailLoad,
    FailSimulation,
    Panic,
}

struct ScriptedEngine {
    script: Script,
    phases: Mutex<Vec<&'static str>>,
}

impl ScriptedEngine {
    fn new(script: Script) -> Self {
        Self {
            script,
            phases: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SimulationExecutor for ScriptedEngine {
    async fn load_dataset(&self, _: &RunConfiguration, _: &Path) -> anyhow::Result<()> {
        self.phases.lock().push("load_dataset");
        if let Script::FailLoad = self.script {
            bail!("dataset generation hit the cost limit");
        }
        Ok(())
    }

    async fn run_simulation(&self, config: &RunConfiguration, output: &Path) -> anyhow::Result<()> {
        self.phases.lock().push("run_simulation");
        match self.script {
            Script::FailSimulation => bail!("dialog manager timed out"),
            Script::Panic => panic!("simulator crashed"),
            _ => {}
        }

        let experiment = output.join("experiments").join("exp_20250101_120000");
        fs::create_dir_all(&experiment)?;
        let mut csv = String::from("id,score,challenge_level\n");
        for i in 0..config.dataset.num_samples {
            let score = if i % 2 == 0 { 1 } else { 0 };
            csv.push_str(&format!("{},{},{}\n", i, score, 5 + i % 5));
        }
        fs::write(experiment.join("results.csv"), csv)?;
        Ok(())
    }
}

fn config() -> RunConfiguration {
    let selection = SharedSelection::new(LlmSelection::new(Provider::OpenAi, "gpt-4o-mini"));
    let params = EvaluationParameters::default().with_num_samples(10);
    ConfigBuilder::build("You are a support agent for an airline.", &selection, &params).unwrap()
}

#[tokio::test]
async fn test_successful_run_then_load_results() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("evaluation_20250101_120000");
    let orchestrator = SessionOrchestrator::new(ScriptedEngine::new(Script::Succeed));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), &output)
        .await
        .unwrap();

    assert_eq!(state, RunState::Completed);
    assert_eq!(session.output_path(), Some(output.as_path()));
    assert!(session.error().is_none());
    assert_eq!(
        *orchestrator.executor().phases.lock(),
        vec!["load_dataset", "run_simulation"]
    );

    let results = ResultsAggregator::load(session.output_path().unwrap()).unwrap();
    let summary = results.summarize();
    assert_eq!(summary.total, 10);
    assert_eq!(summary.success_rate, 50.0);
    assert_eq!(summary.failure_rate, 50.0);
}

#[tokio::test]
async fn test_engine_error_fails_session() {
    let orchestrator = SessionOrchestrator::new(ScriptedEngine::new(Script::FailLoad));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), "unused")
        .await
        .unwrap();

    assert_eq!(state, RunState::Failed);
    let error = session.error().unwrap();
    assert!(error.contains("load_dataset failed"));
    assert!(error.contains("cost limit"));
    assert!(session.output_path().is_none());
    // The second phase never runs after the first fails
    assert_eq!(*orchestrator.executor().phases.lock(), vec!["load_dataset"]);
}

#[tokio::test]
async fn test_simulation_error_fails_session() {
    let orchestrator = SessionOrchestrator::new(ScriptedEngine::new(Script::FailSimulation));
    let mut session = RunSession::new();

    orchestrator
        .start(&mut session, config(), "unused")
        .await
        .unwrap();

    assert_eq!(session.state(), RunState::Failed);
    assert!(session.error().unwrap().contains("dialog manager timed out"));
}

#[tokio::test]
async fn test_engine_panic_is_contained() {
    let orchestrator = SessionOrchestrator::new(ScriptedEngine::new(Script::Panic));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), "unused")
        .await
        .unwrap();

    assert_eq!(state, RunState::Failed);
    assert!(session.error().unwrap().contains("simulator crashed"));
}

#[tokio::test]
async fn test_finished_session_must_be_reset() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = SessionOrchestrator::new(ScriptedEngine::new(Script::Succeed));
    let mut session = RunSession::new();
    orchestrator
        .start(&mut session, config(), temp_dir.path().join("a"))
        .await
        .unwrap();

    let err = orchestrator
        .start(&mut session, config(), temp_dir.path().join("b"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrimError::InvalidState { ref state } if state == "completed"));
    assert_eq!(session.output_path(), Some(temp_dir.path().join("a").as_path()));

    session.reset().unwrap();
    let state = orchestrator
        .start(&mut session, config(), temp_dir.path().join("b"))
        .await
        .unwrap();
    assert_eq!(state, RunState::Completed);
}

#[tokio::test]
async fn test_failed_session_can_be_retried_after_reset() {
    let mut session = RunSession::new();
    SessionOrchestrator::new(ScriptedEngine::new(Script::Panic))
        .start(&mut session, config(), "unused")
        .await
        .unwrap();
    assert_eq!(session.state(), RunState::Failed);

    session.reset().unwrap();
    assert_eq!(session.state(), RunState::Idle);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_selection_change_reaches_every_stage() {
    let selection = SharedSelection::new(LlmSelection::new(Provider::OpenAi, "gpt-4o"));
    let config =
        ConfigBuilder::build("agent", &selection, &EvaluationParameters::default()).unwrap();

    selection
        .replace(LlmSelection::new(Provider::Anthropic, "claude-3-haiku-20240307"))
        .unwrap();

    for (name, point) in config.llm_injection_points() {
        assert_eq!(point.provider(), Provider::Anthropic, "{name}");
        assert_eq!(point.model(), "claude-3-haiku-20240307", "{name}");
    }
}
