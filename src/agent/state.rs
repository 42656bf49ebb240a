//! Per-tick control step.
//!
//! One tick: capture → locate → segment → (bootstrap) → learn from the last
//! prediction → recognize → plan → act. Failures to see the field or read the
//! board end the tick early and are retried; a broken bootstrap or a failing
//! collaborator ends the session.

use crate::agent::config::AgentConfig;
use crate::error::{SessionError, TickFailure};
use crate::game::{get_move, Board, Evaluator, Move, CELL_COUNT};
use crate::platform::{FrameSource, InputSink};
use crate::recognition::TileRecognizer;
use crate::vision::{locate_field, segment_tiles, BoundingRect};

use image::GrayImage;

/// How a tick ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The board was read and a decision was made
    Active,
    /// The tick stopped early and will be retried
    Passive(TickFailure),
    /// The frame source has no more frames
    Finished,
}

/// Read-only view of the last tick, for debugging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSnapshot {
    /// Tracked field rectangle in screen coordinates
    pub tracked: Option<BoundingRect>,
    /// Last recognized board
    pub board: Option<Board>,
    /// Recognition confidence per cell of `board`
    pub confidences: [f32; CELL_COUNT],
    /// Last chosen move
    pub chosen: Option<Move>,
}

/// Agent state carried across ticks.
pub struct AgentContext {
    /// Agent configuration
    pub config: AgentConfig,
    /// Learned templates; survives losing track of the field
    pub recognizer: TileRecognizer,
    evaluator: Box<dyn Evaluator>,
    /// Field rectangle on screen, set on first sighting
    tracked: Option<BoundingRect>,
    /// Board predicted by the last move, used as labels on the next tick
    pending_label: Option<Board>,
    snapshot: TickSnapshot,
    /// Number of ticks run so far
    pub ticks: u64,
}

impl AgentContext {
    pub fn new(config: AgentConfig, evaluator: Box<dyn Evaluator>) -> Self {
        let recognizer = TileRecognizer::new(config.recognizer.clone());
        Self {
            config,
            recognizer,
            evaluator,
            tracked: None,
            pending_label: None,
            snapshot: TickSnapshot::default(),
            ticks: 0,
        }
    }

    pub fn tracked(&self) -> Option<BoundingRect> {
        self.tracked
    }

    pub fn snapshot(&self) -> &TickSnapshot {
        &self.snapshot
    }

    /// Runs one tick.
    pub fn step(
        &mut self,
        source: &mut dyn FrameSource,
        input: &mut dyn InputSink,
    ) -> Result<TickOutcome, SessionError> {
        self.ticks += 1;

        let frame = match source.capture(self.tracked) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(TickOutcome::Finished),
            Err(e) => return Err(SessionError::Capture(e)),
        };
        // A tracked capture starts at the clamped corner of the tracked rect
        let origin = self
            .tracked
            .map(|r| (r.x.max(0), r.y.max(0)))
            .unwrap_or((0, 0));

        let field = match locate_field(&frame, &self.config.locator) {
            Ok(field) => field,
            Err(e) => {
                if self.tracked.take().is_some() {
                    crate::log("Lost track of the field");
                }
                self.pending_label = None;
                self.snapshot.tracked = None;
                return Ok(TickOutcome::Passive(e.into()));
            }
        };

        let tracked = match self.tracked {
            Some(rect) => rect,
            None => {
                let rect = field.rect.translated(origin.0, origin.1);
                crate::log(&format!(
                    "Tracking field at ({}, {}) size {}x{}",
                    rect.x, rect.y, rect.width, rect.height
                ));
                self.tracked = Some(rect);
                rect
            }
        };
        self.snapshot.tracked = Some(tracked);

        let tiles = match segment_tiles(&field.image, &self.config.segmenter) {
            Ok(tiles) => tiles,
            Err(e) => return Ok(TickOutcome::Passive(e.into())),
        };

        if !self.recognizer.is_bootstrapped() {
            self.recognizer.bootstrap(&tiles)?;
        }

        if let Some(label) = self.pending_label.take() {
            self.learn_from_label(&tiles, &label);
        }

        let mut cells = [0u32; CELL_COUNT];
        let mut confidences = [0f32; CELL_COUNT];
        for (i, tile) in tiles.iter().enumerate().take(CELL_COUNT) {
            let m = self.recognizer.match_tile(tile);
            cells[i] = m.value;
            confidences[i] = m.confidence;
        }
        let board = Board::new(cells);
        self.snapshot.board = Some(board);
        self.snapshot.confidences = confidences;

        let plan = match get_move(&board, self.evaluator.as_mut(), self.config.evaluator.mode) {
            Ok(plan) => plan,
            Err(e) => {
                crate::log(&format!("Tick {}: {}\n{}", self.ticks, e, board));
                self.snapshot.chosen = None;
                return Ok(TickOutcome::Passive(e.into()));
            }
        };
        self.snapshot.chosen = Some(plan.chosen);

        if plan.chosen == Move::None {
            crate::log(&format!("Tick {}: no move available", self.ticks));
            return Ok(TickOutcome::Active);
        }

        crate::log(&format!("Tick {}: {}\n{}", self.ticks, plan.chosen, board));
        let (x, y) = tracked.center();
        input.focus(x, y).map_err(SessionError::Input)?;
        input.press(plan.chosen).map_err(SessionError::Input)?;
        self.pending_label = Some(plan.predicted);

        Ok(TickOutcome::Active)
    }

    /// Teaches the recognizer from tiles whose values were predicted.
    ///
    /// Cells predicted empty are skipped since a new tile may have spawned there.
    fn learn_from_label(&mut self, tiles: &[GrayImage], label: &Board) {
        for (tile, &value) in tiles.iter().zip(label.cells()) {
            if value != 0 {
                self.recognizer.add_template(tile, value);
            }
        }
    }
}
