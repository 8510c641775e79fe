//! Expansion and rollout policies used by the rollout search.

use crate::board::{Board, Move};
use crate::random::RandomGenerator;

/// The pair of policies a rollout search consults.
pub trait PlayoutPolicy {
    /// Prior probabilities for every available move, used when a leaf is expanded.
    fn expand_policy(&self, board: &Board) -> Vec<(Move, f64)>;

    /// A score for every available move. The rollout plays the highest-scoring one.
    fn rollout_policy<K: RandomGenerator>(&self, board: &Board, random: &mut K) -> Vec<(Move, f64)>;
}

/// Uniform priors for expansion, uniformly random scores for rollouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPlayoutPolicy;

impl PlayoutPolicy for RandomPlayoutPolicy {
    fn expand_policy(&self, board: &Board) -> Vec<(Move, f64)> {
        uniform_priors(board)
    }

    fn rollout_policy<K: RandomGenerator>(&self, board: &Board, random: &mut K) -> Vec<(Move, f64)> {
        board
            .available_moves()
            .iter()
            .map(|&mv| (mv, random.next_score()))
            .collect()
    }
}

/// Equal probability for every available move; empty when the board is full.
pub fn uniform_priors(board: &Board) -> Vec<(Move, f64)> {
    let available = board.available_moves();
    if available.is_empty() {
        return Vec::new();
    }
    let prior = 1.0 / available.len() as f64;
    available.iter().map(|&mv| (mv, prior)).collect()
}
