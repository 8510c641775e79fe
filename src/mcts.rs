use crate::board::{Board, GameOutcome, Move};
use crate::config::{ConfigError, SearchConfig};
use crate::evaluator::{Evaluation, EvaluatorError};
use crate::random::RandomGenerator;
use crate::search_tree::SearchTree;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while searching.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("the root has no candidate moves")]
    NoCandidateMoves,

    #[error("tree move {0} is not legal on the searched board; was the tree advanced with every move?")]
    IllegalTreeMove(Move),

    #[error("exploration level must be positive and finite, got {0}")]
    InvalidExplorationLevel(f64),
}

/// Produces priors and a value for a non-terminal leaf.
///
/// This is the only step where the rollout search and the evaluator-guided search differ.
/// `board` is the playout's private copy of the position and may be played forward.
pub trait LeafEvaluator {
    fn evaluate_leaf<K: RandomGenerator>(
        &mut self,
        board: &mut Board,
        random: &mut K,
    ) -> Result<Evaluation, SearchError>;
}

/// The main struct for running Monte Carlo tree search over a connect-K [`Board`].
///
/// It holds the persistent search tree, the leaf strategy, the random number generator,
/// and the configuration for the search. Positions are not stored in the tree; every
/// playout replays the selected moves on a copy of the board it is given.
pub struct MonteCarloTreeSearch<S: LeafEvaluator, K: RandomGenerator> {
    tree: SearchTree,
    strategy: S,
    random: K,
    config: SearchConfig,
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<S: LeafEvaluator, K: RandomGenerator> {
    strategy: S,
    random_generator: K,
    config: SearchConfig,
}

impl<S: LeafEvaluator, K: RandomGenerator> MonteCarloTreeSearchBuilder<S, K> {
    /// Creates a new builder around the given leaf strategy.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            random_generator: K::default(),
            config: SearchConfig::default(),
        }
    }

    /// Sets the random number generator for the search.
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the `MonteCarloTreeSearch` instance, rejecting an invalid configuration.
    pub fn build(self) -> Result<MonteCarloTreeSearch<S, K>, ConfigError> {
        MonteCarloTreeSearch::new(self.strategy, self.random_generator, self.config)
    }
}

impl<S: LeafEvaluator, K: RandomGenerator> MonteCarloTreeSearch<S, K> {
    /// Returns a new builder for `MonteCarloTreeSearch`.
    pub fn builder(strategy: S) -> MonteCarloTreeSearchBuilder<S, K> {
        MonteCarloTreeSearchBuilder::new(strategy)
    }

    /// Creates a new search with an empty tree.
    ///
    /// It is recommended to use the builder pattern via `MonteCarloTreeSearch::builder()` instead.
    pub fn new(strategy: S, rg: K, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tree: SearchTree::new(),
            strategy,
            random: rg,
            config,
        })
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// The generator the search draws from. Move sampling shares it so that a seeded
    /// engine stays reproducible end to end.
    pub fn random_mut(&mut self) -> &mut K {
        &mut self.random
    }

    /// Runs one playout from the root: selection, evaluation or terminal scoring,
    /// optional expansion, and backpropagation.
    ///
    /// `board` must be the root position and is left at the position the playout ended in.
    pub fn playout(&mut self, board: &mut Board) -> Result<(), SearchError> {
        let mut node = self.tree.root_id();
        let mut depth = 0usize;
        while let Some((mv, child)) = self.tree.select(node, self.config.exploration_weight) {
            if !board.play(mv) {
                return Err(SearchError::IllegalTreeMove(mv));
            }
            node = child;
            depth += 1;
        }

        // Value for the player to move at the leaf.
        let leaf_value = match board.game_end() {
            GameOutcome::InProgress => {
                let visits = self.tree.get(node).map_or(0, |leaf| leaf.value().visits);
                let evaluation = self.strategy.evaluate_leaf(board, &mut self.random)?;
                if visits >= self.config.effective_expand_bound() {
                    self.tree.expand(node, &evaluation.priors);
                }
                evaluation.value
            }
            outcome => outcome.value_for(board.current_player()),
        };

        // The leaf's statistics are kept for the player who moved into it.
        self.tree.backpropagate(node, -leaf_value);
        trace!(depth, value = leaf_value, "playout finished");
        Ok(())
    }

    /// Runs `playouts` playouts, each on its own copy of `board`.
    pub fn run(&mut self, board: &Board, playouts: u32) -> Result<(), SearchError> {
        for _ in 0..playouts {
            let mut scratch = board.clone();
            self.playout(&mut scratch)?;
        }
        debug!(
            playouts,
            root_visits = self.tree.root().value().visits,
            tree_size = self.tree.node_count(),
            "search finished"
        );
        Ok(())
    }

    /// The root child with the most visits.
    pub fn most_visited_move(&self) -> Option<Move> {
        self.tree.most_visited_root_move()
    }

    /// Re-roots the tree at the child for `mv`, or starts over if that child was never expanded.
    /// Returns whether any statistics were kept.
    pub fn update_with_move(&mut self, mv: Move) -> bool {
        let kept = self.tree.advance(mv);
        trace!(mv, kept, "tree advanced");
        kept
    }

    pub fn reset(&mut self) {
        self.tree.reset();
    }
}
