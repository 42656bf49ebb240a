//! Screen and input collaborators.
//!
//! The control loop only talks to a `FrameSource` and an `InputSink`. The
//! replay backend reads recorded frames from disk and logs the input it would
//! send; the Windows backend captures the desktop and sends real input.

pub mod replay;
#[cfg(windows)]
pub mod win32;

use anyhow::Result;
use image::RgbaImage;

use crate::game::Move;
use crate::vision::BoundingRect;

pub use replay::{InputAction, LoggingInput, ReplaySource};

/// Produces frames of the screen.
pub trait FrameSource {
    /// Captures `region` (clamped to the screen), or the full screen when `None`.
    ///
    /// Returns `Ok(None)` once the source has no more frames.
    fn capture(&mut self, region: Option<BoundingRect>) -> Result<Option<RgbaImage>>;
}

/// Delivers synthetic input to the game.
pub trait InputSink {
    /// Clicks at a screen position so the game window receives keyboard focus.
    fn focus(&mut self, x: i32, y: i32) -> Result<()>;

    /// Presses the arrow key for `mv`.
    fn press(&mut self, mv: Move) -> Result<()>;
}

/// Crops a captured screen to a region the same way every backend does.
pub(crate) fn crop_to_region(frame: RgbaImage, region: Option<BoundingRect>) -> RgbaImage {
    match region {
        Some(rect) => crate::vision::preprocess::crop_rect(&frame, &rect),
        None => frame,
    }
}
