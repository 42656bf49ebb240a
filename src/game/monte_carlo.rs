//! Default move evaluator.
//!
//! Monte Carlo mode plays random games from each first move and prefers moves
//! whose rollouts both score well and survive long. Greedy mode takes the move
//! with the largest immediate merge score.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::board::{simulate_scored, Board, Move};
use super::planner::Evaluator;
use crate::agent::config::{EvaluationMode, EvaluatorConfig};

pub struct MonteCarloEvaluator<R: Rng = StdRng> {
    config: EvaluatorConfig,
    rng: R,
}

impl MonteCarloEvaluator<StdRng> {
    /// Seeds from the config, or from OS entropy when no seed is set.
    pub fn from_config(config: &EvaluatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config.clone(), rng)
    }
}

impl<R: Rng> MonteCarloEvaluator<R> {
    pub fn with_rng(config: EvaluatorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    fn monte_carlo(&mut self, board: &Board) -> Move {
        if board.is_game_over() {
            return Move::None;
        }

        let mut scores = [0u64; 4];
        let mut steps = [0u64; 4];
        let mut runs = [0u64; 4];

        for _ in 0..self.config.simulations {
            let first = self.rng.gen_range(0..4);
            let (after, score) = simulate_scored(board, Move::SLIDES[first]);
            if after == *board {
                continue;
            }
            scores[first] += score as u64;

            let mut state = after.with_random_tile(&mut self.rng);
            while !state.is_game_over() {
                steps[first] += 1;
                let mv = Move::SLIDES[self.rng.gen_range(0..4)];
                let (next, score) = simulate_scored(&state, mv);
                scores[first] += score as u64;
                if next != state {
                    state = next.with_random_tile(&mut self.rng);
                }
            }
            runs[first] += 1;
        }

        let average = |totals: &[u64; 4]| -> [f64; 4] {
            std::array::from_fn(|i| {
                if runs[i] == 0 {
                    0.0
                } else {
                    totals[i] as f64 / runs[i] as f64
                }
            })
        };
        let avg_scores = average(&scores);
        let avg_steps = average(&steps);
        let score_total: f64 = avg_scores.iter().sum();
        let steps_total: f64 = avg_steps.iter().sum();

        let normalized = |value: f64, total: f64| if total > 0.0 { value / total } else { 0.0 };

        let mut best: Option<(Move, f64)> = None;
        for i in 0..4 {
            if runs[i] == 0 {
                continue;
            }
            let rating = normalized(avg_scores[i], score_total) * self.config.score_weight as f64
                + normalized(avg_steps[i], steps_total) * self.config.steps_weight as f64;
            if best.is_none_or(|(_, r)| rating > r) {
                best = Some((Move::SLIDES[i], rating));
            }
        }

        // Too few simulations to sample a legal move
        best.map(|(mv, _)| mv).unwrap_or_else(|| greedy(board))
    }
}

impl<R: Rng> Evaluator for MonteCarloEvaluator<R> {
    fn evaluate(&mut self, board: &Board, mode: EvaluationMode) -> Move {
        match mode {
            EvaluationMode::Auto | EvaluationMode::MonteCarlo => self.monte_carlo(board),
            EvaluationMode::Greedy => greedy(board),
        }
    }
}

/// The board-changing move with the best (merge score, empty cells), or `None`.
pub fn greedy(board: &Board) -> Move {
    let mut best: Option<(Move, (u32, usize))> = None;
    for mv in Move::SLIDES {
        let (after, score) = simulate_scored(board, mv);
        if after == *board {
            continue;
        }
        let key = (score, after.count_empty());
        if best.is_none_or(|(_, k)| key > k) {
            best = Some((mv, key));
        }
    }
    best.map(|(mv, _)| mv).unwrap_or(Move::None)
}
