//! Run lifecycle
//!
//! The session context, the engine interface, and the orchestrator that
//! moves a session through one run.

mod executor;
mod orchestrator;
mod state;

pub use executor::{
    CONFIG_SNAPSHOT_FILE, ExecutorSettings, Phase, ProcessExecutor, SimulationExecutor,
};
pub use orchestrator::SessionOrchestrator;
pub use state::{RunSession, RunState};
