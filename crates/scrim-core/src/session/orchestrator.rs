//! Session orchestrator
//!
//! Drives a [`RunSession`] through one engine run. Starting awaits both
//! engine phases before returning; engine errors and panics end up in the
//! session as a Failed state, never as a fault in the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::FutureExt;
use tracing::{error, info};

use super::executor::SimulationExecutor;
use super::state::{RunSession, RunState};
use crate::config::RunConfiguration;
use crate::error::ScrimResult;

/// Runs the engine on behalf of a session
pub struct SessionOrchestrator<E> {
    executor: E,
}

impl<E: SimulationExecutor> SessionOrchestrator<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run the engine with `config`, writing under `output_path`.
    ///
    /// Fails with `InvalidState` (leaving the session untouched) unless the
    /// session is Idle. Otherwise returns the terminal state reached:
    /// Completed with `output_path` recorded, or Failed with the error text.
    pub async fn start(
        &self,
        session: &mut RunSession,
        config: RunConfiguration,
        output_path: impl Into<PathBuf>,
    ) -> ScrimResult<RunState> {
        let output_path = output_path.into();
        let config = session.begin(config)?;

        info!(
            output = %output_path.display(),
            provider = %config.llm().provider(),
            model = %config.llm().model(),
            num_samples = config.dataset.num_samples,
            "Starting evaluation run"
        );

        match self.execute(&config, &output_path).await {
            Ok(()) => {
                info!(output = %output_path.display(), "Evaluation run completed");
                session.complete(output_path);
            }
            Err(message) => {
                error!(error = %message, "Evaluation run failed");
                session.fail(message);
            }
        }

        Ok(session.state())
    }

    async fn execute(&self, config: &RunConfiguration, output_path: &Path) -> Result<(), String> {
        let phases = async {
            self.executor
                .load_dataset(config, output_path)
                .await
                .context("load_dataset failed")?;
            self.executor
                .run_simulation(config, output_path)
                .await
                .context("run_simulation failed")?;
            Ok::<(), anyhow::Error>(())
        };

        match AssertUnwindSafe(phases).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(payload) => Err(format!("engine panicked: {}", panic_message(&*payload))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, EvaluationParameters};
    use crate::error::ScrimError;
    use crate::provider::{LlmSelection, Provider, SharedSelection};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl SimulationExecutor for RecordingExecutor {
        async fn load_dataset(&self, _: &RunConfiguration, _: &Path) -> anyhow::Result<()> {
            self.calls.lock().push("load_dataset");
            Ok(())
        }

        async fn run_simulation(&self, _: &RunConfiguration, _: &Path) -> anyhow::Result<()> {
            self.calls.lock().push("run_simulation");
            Ok(())
        }
    }

    fn config() -> RunConfiguration {
        let selection = SharedSelection::new(LlmSelection::new(Provider::OpenAi, "gpt-4o"));
        ConfigBuilder::build("agent", &selection, &EvaluationParameters::default()).unwrap()
    }

    #[tokio::test]
    async fn test_phases_run_in_order() {
        let orchestrator = SessionOrchestrator::new(RecordingExecutor::default());
        let mut session = RunSession::new();

        let state = orchestrator
            .start(&mut session, config(), "results/x")
            .await
            .unwrap();

        assert_eq!(state, RunState::Completed);
        assert_eq!(
            *orchestrator.executor().calls.lock(),
            vec!["load_dataset", "run_simulation"]
        );
        assert_eq!(session.output_path(), Some(Path::new("results/x")));
    }

    #[tokio::test]
    async fn test_start_while_running_is_rejected() {
        let orchestrator = SessionOrchestrator::new(RecordingExecutor::default());
        let mut session = RunSession::new();
        session.begin(config()).unwrap();

        let err = orchestrator
            .start(&mut session, config(), "results/y")
            .await
            .unwrap_err();

        assert!(matches!(err, ScrimError::InvalidState { .. }));
        assert_eq!(session.state(), RunState::Running);
        assert!(session.output_path().is_none());
        assert!(orchestrator.executor().calls.lock().is_empty());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "unknown panic payload");
    }
}
