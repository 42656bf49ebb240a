//! Move selection.
//!
//! Validates a recognized board, simulates every candidate move and lets an
//! `Evaluator` pick one. The predicted board of the chosen move is what the
//! agent expects to see on the next tick, minus the spawned tile.

use super::board::{simulate, Board, Move};
use crate::agent::config::EvaluationMode;
use crate::error::PlanError;

/// Picks a move for a board.
pub trait Evaluator {
    fn evaluate(&mut self, board: &Board, mode: EvaluationMode) -> Move;
}

/// Result of planning one move.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub chosen: Move,
    /// Board after the chosen move, before a tile spawns
    pub predicted: Board,
    /// Every candidate move with its simulated board, in `Move::ALL` order
    pub candidates: [(Move, Board); 5],
}

/// Rejects boards with a cell that is neither 0 nor a power of two >= 2.
pub fn validate(board: &Board) -> Result<(), PlanError> {
    match board
        .cells()
        .iter()
        .enumerate()
        .find(|(_, v)| **v != 0 && (**v < 2 || !v.is_power_of_two()))
    {
        Some((index, &value)) => Err(PlanError::InvalidCell { index, value }),
        None => Ok(()),
    }
}

pub fn get_move(
    board: &Board,
    evaluator: &mut dyn Evaluator,
    mode: EvaluationMode,
) -> Result<Plan, PlanError> {
    validate(board)?;

    let candidates = Move::ALL.map(|mv| (mv, simulate(board, mv)));
    let chosen = evaluator.evaluate(board, mode);
    let predicted = candidates
        .iter()
        .find(|(mv, _)| *mv == chosen)
        .map(|(_, b)| *b)
        .unwrap_or(*board);

    Ok(Plan {
        chosen,
        predicted,
        candidates,
    })
}
