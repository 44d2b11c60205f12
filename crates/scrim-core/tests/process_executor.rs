//! Integration tests for the child-process engine bridge
#![cfg(unix)]

use scrim_core::session::CONFIG_SNAPSHOT_FILE;
use scrim_core::{
    ConfigBuilder, EvaluationParameters, ExecutorSettings, LlmSelection, ProcessExecutor,
    Provider, ResultsAggregator, RunConfiguration, RunSession, RunState, SessionOrchestrator,
    SharedSelection,
};
use tempfile::TempDir;

const ENGINE_SCRIPT: &str = r#"
phase="$1"; config="$2"; output="$3"
test -f "$config" || { echo "config missing" >&2; exit 3; }
case "$phase" in
  load_dataset) echo "dataset ready" ;;
  run_simulation)
    mkdir -p "$output/experiments/20250101_120000"
    printf 'id,score,challenge_level\n1,1,5\n2,0,7\n' > "$output/experiments/20250101_120000/results.csv"
    ;;
  *) echo "unknown phase $phase" >&2; exit 2 ;;
esac
"#;

fn settings(script: &str) -> ExecutorSettings {
    ExecutorSettings {
        program: "sh".to_string(),
        args: ["-c", script, "engine", "{phase}", "{config}", "{output}"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        working_dir: None,
    }
}

fn config() -> RunConfiguration {
    let selection = SharedSelection::new(LlmSelection::new(Provider::Google, "gemini-1.5-flash"));
    ConfigBuilder::build("agent", &selection, &EvaluationParameters::default()).unwrap()
}

#[tokio::test]
async fn test_process_engine_full_run() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("run");
    let orchestrator = SessionOrchestrator::new(ProcessExecutor::new(settings(ENGINE_SCRIPT)));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), &output)
        .await
        .unwrap();

    assert_eq!(state, RunState::Completed, "{:?}", session.error());

    let snapshot = std::fs::read_to_string(output.join(CONFIG_SNAPSHOT_FILE)).unwrap();
    assert!(snapshot.contains("gemini-1.5-flash"));

    let set = ResultsAggregator::load(&output).unwrap();
    assert_eq!(set.len(), 2);
}

#[tokio::test]
async fn test_relative_output_with_engine_working_dir() {
    let engine_dir = TempDir::new().unwrap();
    let cwd = std::env::current_dir().unwrap();
    let output_dir = tempfile::Builder::new()
        .prefix("scrim-relative-run-")
        .tempdir_in(&cwd)
        .unwrap();
    let output = output_dir.path().strip_prefix(&cwd).unwrap().to_path_buf();
    assert!(output.is_relative());

    let mut settings = settings(ENGINE_SCRIPT);
    settings.working_dir = Some(engine_dir.path().to_path_buf());
    let orchestrator = SessionOrchestrator::new(ProcessExecutor::new(settings));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), &output)
        .await
        .unwrap();

    assert_eq!(state, RunState::Completed, "{:?}", session.error());
    assert!(output.join(CONFIG_SNAPSHOT_FILE).is_file());
    assert!(!engine_dir.path().join(&output).exists());

    let set = ResultsAggregator::load(session.output_path().unwrap()).unwrap();
    assert_eq!(set.len(), 2);
}

#[tokio::test]
async fn test_nonzero_exit_carries_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let script = r#"echo "quota exceeded for $1" >&2; exit 1"#;
    let orchestrator = SessionOrchestrator::new(ProcessExecutor::new(settings(script)));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), temp_dir.path().join("run"))
        .await
        .unwrap();

    assert_eq!(state, RunState::Failed);
    let error = session.error().unwrap();
    assert!(error.contains("load_dataset"));
    assert!(error.contains("quota exceeded for load_dataset"));
}

#[tokio::test]
async fn test_missing_program_fails_session() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = settings("true");
    settings.program = "/nonexistent/engine/binary".to_string();
    let orchestrator = SessionOrchestrator::new(ProcessExecutor::new(settings));
    let mut session = RunSession::new();

    let state = orchestrator
        .start(&mut session, config(), temp_dir.path().join("run"))
        .await
        .unwrap();

    assert_eq!(state, RunState::Failed);
    assert!(session.error().unwrap().contains("Failed to launch"));
}
