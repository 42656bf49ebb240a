//! The control loop that ties vision, recognition and planning together.

pub mod config;
pub mod runner;
pub mod state;

pub use config::{get_config, init_config, AgentConfig, EvaluationMode};
pub use runner::run_agent;
pub use state::{AgentContext, TickOutcome, TickSnapshot};
