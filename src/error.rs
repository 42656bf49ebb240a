//! Error taxonomy.
//!
//! Recoverable conditions (`LocateError`, `SegmentError`, `PlanError`) end a
//! tick early and are retried on the next one. `BootstrapError` and the
//! collaborator failures in `SessionError` end the session.

use crate::recognition::Symbol;

/// The playing field could not be found in the captured frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocateError {
    #[error("no contour passed the grid filters")]
    GridNotFound,
}

/// The located field did not split into the expected number of tiles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    #[error("found {found} tiles, expected {expected}")]
    TileCount { found: usize, expected: usize },
}

/// The recognized board cannot be a real game state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("cell {index} holds {value}, which is not 0 or a power of two")]
    InvalidCell { index: usize, value: u32 },
}

/// The seed tiles broke their single-digit contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BootstrapError {
    #[error("seed tile {index} has {shapes} glyphs and {holes} holes")]
    AmbiguousSeed {
        index: usize,
        shapes: usize,
        holes: usize,
    },

    #[error("seed tiles exhausted before learning {missing:?}")]
    SeedExhausted { missing: Vec<Symbol> },
}

/// A per-tick failure that only delays the next attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickFailure {
    #[error("field not located: {0}")]
    Locate(#[from] LocateError),

    #[error("segmentation failed: {0}")]
    Segment(#[from] SegmentError),

    #[error("board rejected: {0}")]
    Plan(#[from] PlanError),
}

/// A failure that ends the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("capture failed: {0:#}")]
    Capture(anyhow::Error),

    #[error("input dispatch failed: {0:#}")]
    Input(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = SegmentError::TileCount {
            found: 12,
            expected: 16,
        };
        assert_eq!(e.to_string(), "found 12 tiles, expected 16");

        let tick: TickFailure = PlanError::InvalidCell { index: 3, value: 6 }.into();
        assert_eq!(
            tick.to_string(),
            "board rejected: cell 3 holds 6, which is not 0 or a power of two"
        );

        let fatal: SessionError = BootstrapError::SeedExhausted {
            missing: vec![Symbol::Empty],
        }
        .into();
        assert!(fatal.to_string().starts_with("bootstrap failed"));
    }
}
