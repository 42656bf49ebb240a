//! Agent runner - the polling loop around `AgentContext::step`.
//!
//! Ticks quickly while the board is being read and played, and backs off
//! while the field is missing or unreadable.

use std::time::Duration;

use crate::agent::config::TimingConfig;
use crate::agent::state::{AgentContext, TickOutcome};
use crate::error::SessionError;
use crate::platform::{FrameSource, InputSink};

/// Delay before the next tick, or `None` when the loop should stop.
pub fn next_delay(outcome: &TickOutcome, timing: &TimingConfig) -> Option<Duration> {
    match outcome {
        TickOutcome::Active => Some(Duration::from_millis(timing.active_delay_ms)),
        TickOutcome::Passive(_) => Some(Duration::from_millis(timing.passive_delay_ms)),
        TickOutcome::Finished => None,
    }
}

/// Runs ticks until the frame source is exhausted or a fatal error occurs.
pub fn run_agent(
    ctx: &mut AgentContext,
    source: &mut dyn FrameSource,
    input: &mut dyn InputSink,
) -> Result<(), SessionError> {
    crate::log("Starting agent loop");

    loop {
        let outcome = match ctx.step(source, input) {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::log(&format!("Agent stopped after {} ticks: {}", ctx.ticks, e));
                return Err(e);
            }
        };

        if let TickOutcome::Passive(reason) = &outcome {
            crate::log(&format!("Tick {}: {}", ctx.ticks, reason));
        }

        match next_delay(&outcome, &ctx.config.timing) {
            Some(delay) => std::thread::sleep(delay),
            None => {
                crate::log(&format!("Frame source exhausted after {} ticks", ctx.ticks));
                return Ok(());
            }
        }
    }
}
