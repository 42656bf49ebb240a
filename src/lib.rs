//! 2048 Agent
//!
//! Plays the 4x4 tile-merging puzzle by watching the screen. Each tick it
//! locates the playing field, cuts it into tiles, reads the tile values with
//! templates it learns on its own, simulates the four moves and sends the
//! chosen one as synthetic input.

pub mod agent;
pub mod error;
pub mod game;
pub mod paths;
pub mod platform;
pub mod recognition;
pub mod vision;

#[cfg(test)]
mod testing;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("agent_2048.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
