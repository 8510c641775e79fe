use crate::board::{Board, Move};
use crate::config::{ConfigError, SearchConfig};
use crate::evaluator::Evaluation;
use crate::mcts::{LeafEvaluator, MonteCarloTreeSearch, SearchError};
use crate::policy::{PlayoutPolicy, RandomPlayoutPolicy};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::search_tree::SearchTree;
use std::fmt;
use tracing::{debug, warn};

/// Scores a leaf by playing it out to the end with the rollout policy.
#[derive(Debug, Clone)]
pub struct RolloutEvaluation<P: PlayoutPolicy = RandomPlayoutPolicy> {
    policy: P,
    rollout_limit: u32,
}

impl<P: PlayoutPolicy> RolloutEvaluation<P> {
    pub fn new(policy: P, rollout_limit: u32) -> Self {
        Self {
            policy,
            rollout_limit,
        }
    }

    /// Plays the highest-scoring move until the game ends or `rollout_limit` moves were made.
    ///
    /// Returns `1` if the player to move at the start wins, `-1` if they lose, and `0` for a
    /// draw or a rollout cut off by the limit.
    pub fn rollout<K: RandomGenerator>(&self, board: &mut Board, random: &mut K) -> f64 {
        let player = board.current_player();
        for _ in 0..self.rollout_limit {
            if board.game_end().is_over() {
                break;
            }
            let best = self
                .policy
                .rollout_policy(board, random)
                .into_iter()
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let Some((mv, _)) = best else {
                break;
            };
            board.play(mv);
        }

        let outcome = board.game_end();
        if !outcome.is_over() {
            warn!(limit = self.rollout_limit, "rollout reached its move limit");
        }
        outcome.value_for(player)
    }
}

impl<P: PlayoutPolicy> LeafEvaluator for RolloutEvaluation<P> {
    fn evaluate_leaf<K: RandomGenerator>(
        &mut self,
        board: &mut Board,
        random: &mut K,
    ) -> Result<Evaluation, SearchError> {
        let priors = self.policy.expand_policy(board);
        let value = self.rollout(board, random);
        Ok(Evaluation { priors, value })
    }
}

/// Classic MCTS: uniform priors and random rollouts to the end of the game.
///
/// The tree persists between calls; keep it in step with the game through
/// [`update_with_move`](PureSearchEngine::update_with_move) or [`reset`](PureSearchEngine::reset).
pub struct PureSearchEngine<
    K: RandomGenerator = StandardRandomGenerator,
    P: PlayoutPolicy = RandomPlayoutPolicy,
> {
    search: MonteCarloTreeSearch<RolloutEvaluation<P>, K>,
}

impl PureSearchEngine {
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        Self::with_random_generator(config, StandardRandomGenerator::default())
    }
}

impl<K: RandomGenerator> PureSearchEngine<K> {
    pub fn with_random_generator(config: SearchConfig, random: K) -> Result<Self, ConfigError> {
        Self::with_policy(config, random, RandomPlayoutPolicy)
    }
}

impl<K: RandomGenerator, P: PlayoutPolicy> PureSearchEngine<K, P> {
    pub fn with_policy(config: SearchConfig, random: K, policy: P) -> Result<Self, ConfigError> {
        let strategy = RolloutEvaluation::new(policy, config.rollout_limit);
        let search = MonteCarloTreeSearch::builder(strategy)
            .with_config(config)
            .with_random_generator(random)
            .build()?;
        Ok(Self { search })
    }

    /// Searches the position and returns the most visited move.
    ///
    /// On an empty board the center cell is returned without searching.
    pub fn get_move(&mut self, board: &Board) -> Result<Move, SearchError> {
        if board.is_empty() {
            return Ok(board.center());
        }
        let budget = self.search.config().compute_budget;
        self.search.run(board, budget)?;
        let mv = self
            .search
            .most_visited_move()
            .ok_or(SearchError::NoCandidateMoves)?;
        debug!(mv, "pure search picked a move");
        Ok(mv)
    }

    /// A cheaper search of `compute_budget / decay_level` playouts, used to predict the
    /// opponent's reply. The tree keeps the statistics.
    pub fn think(&mut self, board: &Board, decay_level: u32) -> Result<Move, SearchError> {
        if decay_level == 0 {
            return Err(ConfigError::ZeroDecayLevel.into());
        }
        let playouts = self.search.config().compute_budget / decay_level;
        self.search.run(board, playouts)?;
        self.search
            .most_visited_move()
            .ok_or(SearchError::NoCandidateMoves)
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
}

impl<K: RandomGenerator, P: PlayoutPolicy> fmt::Display for PureSearchEngine<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.search.config();
        write!(
            f,
            "pure MCTS (budget {}, c = {})",
            config.compute_budget, config.exploration_weight
        )
    }
}
