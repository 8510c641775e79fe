use crate::board::{Board, Move};
use crate::config::{ConfigError, SearchConfig};
use crate::evaluator::{Evaluation, Evaluator};
use crate::mcts::{LeafEvaluator, MonteCarloTreeSearch, SearchError};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::search_tree::SearchTree;
use std::fmt;
use tracing::debug;

/// Added to visit counts before taking the logarithm so unvisited moves stay finite.
const VISIT_EPSILON: f64 = 1e-10;

/// Asks an [`Evaluator`] for the priors and the value of a leaf.
///
/// Terminal leaves never reach the evaluator: the search scores them from the actual outcome.
#[derive(Debug, Clone)]
pub struct GuidedEvaluation<E: Evaluator> {
    evaluator: E,
}

impl<E: Evaluator> GuidedEvaluation<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }
}

impl<E: Evaluator> LeafEvaluator for GuidedEvaluation<E> {
    fn evaluate_leaf<K: RandomGenerator>(
        &mut self,
        board: &mut Board,
        _random: &mut K,
    ) -> Result<Evaluation, SearchError> {
        Ok(self.evaluator.evaluate(board)?.checked()?)
    }
}

/// Probabilities over the root's candidate moves.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveDistribution {
    moves: Vec<Move>,
    probabilities: Vec<f64>,
}

impl MoveDistribution {
    /// Pairs `moves[i]` with `probabilities[i]`.
    ///
    /// # Panics
    ///
    /// In debug builds, when the two vectors differ in length.
    pub fn new(moves: Vec<Move>, probabilities: Vec<f64>) -> Self {
        debug_assert_eq!(
            moves.len(),
            probabilities.len(),
            "every move needs exactly one probability"
        );
        Self {
            moves,
            probabilities,
        }
    }

    /// `softmax(ln(visits + 1e-10) / temperature)`, computed with the maximum subtracted.
    ///
    /// A temperature of 1 reproduces the visit proportions; smaller temperatures sharpen the
    /// distribution toward the most visited move.
    pub fn from_visits(visits: &[(Move, u32)], temperature: f64) -> Self {
        let logits: Vec<f64> = visits
            .iter()
            .map(|&(_, n)| (f64::from(n) + VISIT_EPSILON).ln() / temperature)
            .collect();
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|logit| (logit - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        Self {
            moves: visits.iter().map(|&(mv, _)| mv).collect(),
            probabilities: exps.into_iter().map(|e| e / sum).collect(),
        }
    }

    /// Visit counts divided by their total. Falls back to uniform when nothing was visited.
    pub fn normalized(visits: &[(Move, u32)]) -> Self {
        let total: u32 = visits.iter().map(|&(_, n)| n).sum();
        let probabilities = if total == 0 {
            vec![1.0 / visits.len() as f64; visits.len()]
        } else {
            visits
                .iter()
                .map(|&(_, n)| f64::from(n) / f64::from(total))
                .collect()
        };
        Self {
            moves: visits.iter().map(|&(mv, _)| mv).collect(),
            probabilities,
        }
    }

    /// The candidate moves, in the order the search expanded them.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// One probability per entry of [`moves`](Self::moves).
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of candidate moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True when there are no candidate moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// `(move, probability)` pairs in candidate order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Move, f64)> + '_ {
        self.moves.iter().copied().zip(self.probabilities.iter().copied())
    }

    /// The probability of `mv`, or zero when it is not a candidate.
    pub fn probability_of(&self, mv: Move) -> f64 {
        self.iter()
            .find(|&(candidate, _)| candidate == mv)
            .map_or(0.0, |(_, p)| p)
    }

    /// The most probable move; the first one listed wins ties.
    pub fn best_move(&self) -> Option<Move> {
        let mut best: Option<(Move, f64)> = None;
        for (mv, p) in self.iter() {
            if best.is_none_or(|(_, best_p)| p > best_p) {
                best = Some((mv, p));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Draws a move in proportion to its probability.
    pub fn sample<K: RandomGenerator>(&self, random: &mut K) -> Option<Move> {
        let total: f64 = self.probabilities.iter().sum();
        let r = random.next_score() * total;
        let mut cumsum = 0.0;
        for (mv, p) in self.iter() {
            cumsum += p;
            if r < cumsum {
                return Some(mv);
            }
        }

        // Rounding can leave r just past the last bucket.
        self.iter().rev().find(|&(_, p)| p > 0.0).map(|(mv, _)| mv)
    }

    /// `(1 - epsilon) * p + epsilon * noise` for each move, matched by position.
    ///
    /// # Panics
    ///
    /// In debug builds, when `noise` does not have one entry per move.
    pub fn mixed_with(&self, noise: &[f64], epsilon: f64) -> Self {
        debug_assert_eq!(noise.len(), self.len(), "noise needs one entry per move");
        let probabilities = self
            .probabilities
            .iter()
            .zip(noise)
            .map(|(&p, &n)| (1.0 - epsilon) * p + epsilon * n)
            .collect();
        Self::new(self.moves.clone(), probabilities)
    }

    /// A dense vector with one entry per board cell, zero for moves not in the distribution.
    pub fn to_policy_vector(&self, cell_count: usize) -> Vec<f32> {
        let mut policy = vec![0.0; cell_count];
        for (mv, p) in self.iter() {
            if let Some(slot) = policy.get_mut(mv) {
                *slot = p as f32;
            }
        }
        policy
    }
}

/// AlphaZero-style search: an evaluator supplies priors and leaf values, no rollouts are played.
pub struct GuidedSearchEngine<E: Evaluator, K: RandomGenerator = StandardRandomGenerator> {
    search: MonteCarloTreeSearch<GuidedEvaluation<E>, K>,
}

impl<E: Evaluator> GuidedSearchEngine<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Result<Self, ConfigError> {
        Self::with_random_generator(evaluator, config, StandardRandomGenerator::default())
    }
}

impl<E: Evaluator, K: RandomGenerator> GuidedSearchEngine<E, K> {
    pub fn with_random_generator(
        evaluator: E,
        config: SearchConfig,
        random: K,
    ) -> Result<Self, ConfigError> {
        let search = MonteCarloTreeSearch::builder(GuidedEvaluation::new(evaluator))
            .with_config(config)
            .with_random_generator(random)
            .build()?;
        Ok(Self { search })
    }

    /// Runs the full budget and turns the root's visit counts into a distribution sharpened
    /// by `exploration_level` (the softmax temperature).
    pub fn get_move(
        &mut self,
        board: &Board,
        exploration_level: f64,
    ) -> Result<MoveDistribution, SearchError> {
        if !(exploration_level.is_finite() && exploration_level > 0.0) {
            return Err(SearchError::InvalidExplorationLevel(exploration_level));
        }
        let budget = self.search.config().compute_budget;
        self.search.run(board, budget)?;
        let visits = self.root_visits()?;
        let distribution = MoveDistribution::from_visits(&visits, exploration_level);
        debug!(
            candidates = distribution.len(),
            best = ?distribution.best_move(),
            "guided search finished"
        );
        Ok(distribution)
    }

    /// Runs `compute_budget / decay_level` playouts and returns the plain visit proportions.
    pub fn think(
        &mut self,
        board: &Board,
        decay_level: u32,
    ) -> Result<MoveDistribution, SearchError> {
        if decay_level == 0 {
            return Err(ConfigError::ZeroDecayLevel.into());
        }
        let playouts = self.search.config().compute_budget / decay_level;
        self.search.run(board, playouts)?;
        Ok(MoveDistribution::normalized(&self.root_visits()?))
    }

    fn root_visits(&self) -> Result<Vec<(Move, u32)>, SearchError> {
        let visits: Vec<(Move, u32)> = self
            .search
            .tree()
            .root_children()
            .map(|(mv, node)| (mv, node.visits))
            .collect();
        if visits.is_empty() {
            return Err(SearchError::NoCandidateMoves);
        }
        Ok(visits)
    }

    pub fn update_with_move(&mut self, mv: Move) -> bool {
        self.search.update_with_move(mv)
    }

    pub fn reset(&mut self) {
        self.search.reset();
    }

    pub fn tree(&self) -> &SearchTree {
        self.search.tree()
    }

    pub fn config(&self) -> &SearchConfig {
        self.search.config()
    }

    pub fn evaluator(&self) -> &E {
        self.search.strategy().evaluator()
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        self.search.strategy_mut().evaluator_mut()
    }

    pub fn random_mut(&mut self) -> &mut K {
        self.search.random_mut()
    }
}

impl<E: Evaluator, K: RandomGenerator> fmt::Display for GuidedSearchEngine<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.search.config();
        write!(
            f,
            "guided MCTS (budget {}, c = {}, expand after {})",
            config.compute_budget,
            config.exploration_weight,
            config.effective_expand_bound()
        )
    }
}
