//! Offline backend: recorded frames in, logged input out.

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

use super::{crop_to_region, FrameSource, InputSink};
use crate::game::Move;
use crate::vision::BoundingRect;

/// Plays back PNG screenshots from a directory in file-name order.
pub struct ReplaySource {
    frames: Vec<PathBuf>,
    next: usize,
}

impl ReplaySource {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(anyhow!("Replay directory not found: {}", dir.display()));
        }

        let mut frames: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        frames.sort();

        crate::log(&format!(
            "Replaying {} frames from {}",
            frames.len(),
            dir.display()
        ));
        Ok(Self { frames, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplaySource {
    fn capture(&mut self, region: Option<BoundingRect>) -> Result<Option<RgbaImage>> {
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let frame = image::open(path)
            .with_context(|| format!("Failed to load frame {}", path.display()))?
            .to_rgba8();
        Ok(Some(crop_to_region(frame, region)))
    }
}

/// An input action recorded by `LoggingInput`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Focus { x: i32, y: i32 },
    Press(Move),
}

/// Records and logs input instead of sending it.
#[derive(Debug, Default)]
pub struct LoggingInput {
    pub actions: Vec<InputAction>,
}

impl InputSink for LoggingInput {
    fn focus(&mut self, x: i32, y: i32) -> Result<()> {
        crate::log(&format!("[dry run] click at ({}, {})", x, y));
        self.actions.push(InputAction::Focus { x, y });
        Ok(())
    }

    fn press(&mut self, mv: Move) -> Result<()> {
        crate::log(&format!("[dry run] press {}", mv));
        self.actions.push(InputAction::Press(mv));
        Ok(())
    }
}
