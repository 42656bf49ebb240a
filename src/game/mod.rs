//! Game rules and move planning.

pub mod board;
pub mod monte_carlo;
pub mod planner;

pub use board::{simulate, simulate_scored, Board, Move, CELL_COUNT};
pub use monte_carlo::MonteCarloEvaluator;
pub use planner::{get_move, validate, Evaluator, Plan};
