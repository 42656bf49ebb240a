//! 2048 Agent
//!
//! Usage: `agent-2048 [REPLAY_DIR]`
//!
//! Without arguments the agent watches the desktop and plays with real
//! keyboard input (Windows only). Given a directory of PNG screenshots it
//! replays them in name order and only logs the input it would send.

use agent_2048::agent::{get_config, init_config, run_agent, AgentContext};
use agent_2048::game::MonteCarloEvaluator;
use agent_2048::platform::{LoggingInput, ReplaySource};
use agent_2048::{log, paths};
use anyhow::Result;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = match panic_info.location() {
            Some(loc) => format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()),
            None => String::new(),
        };
        eprintln!("[PANIC]{} {}", location, msg);
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    paths::ensure_directories()?;
    init_config();
    let config = get_config().clone();

    let evaluator = MonteCarloEvaluator::from_config(&config.evaluator);
    let mut ctx = AgentContext::new(config, Box::new(evaluator));

    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(dir) => {
            log(&format!("Dry run over {}", dir.display()));
            let mut source = ReplaySource::open(&dir)?;
            let mut input = LoggingInput::default();
            run_agent(&mut ctx, &mut source, &mut input)?;
            log(&format!("Dry run sent {} input actions", input.actions.len()));
            Ok(())
        }
        None => run_live(&mut ctx),
    }
}

#[cfg(windows)]
fn run_live(ctx: &mut AgentContext) -> Result<()> {
    use agent_2048::platform::win32::{ScreenCapture, SendInputSink};
    use std::time::Duration;

    log("Starting live agent");
    let mut source = ScreenCapture::new()?;
    let mut input = SendInputSink::new(Duration::from_millis(ctx.config.timing.focus_delay_ms));
    run_agent(ctx, &mut source, &mut input)?;
    Ok(())
}

#[cfg(not(windows))]
fn run_live(_ctx: &mut AgentContext) -> Result<()> {
    Err(anyhow::anyhow!(
        "Live capture is only supported on Windows; pass a replay directory instead"
    ))
}
