//! Agents that hold a seat in a game and pick moves with one of the search engines.

use crate::board::{Board, Move, Player};
use crate::engines::guided::{GuidedSearchEngine, MoveDistribution};
use crate::engines::pure::PureSearchEngine;
use crate::evaluator::Evaluator;
use crate::mcts::SearchError;
use crate::random::{RandomGenerator, StandardRandomGenerator};
use rand_distr::{Distribution, Gamma};
use thiserror::Error;
use tracing::debug;

/// Temperature used by guided agents unless told otherwise: close to picking the
/// most visited move.
pub const DEFAULT_EXPLORATION_LEVEL: f64 = 1e-4;

/// Decay level used when guessing the opponent's reply.
pub const DEFAULT_DECAY_LEVEL: u32 = 100;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent plays {expected} but it is {actual}'s turn")]
    TurnOrder { expected: Player, actual: Player },

    #[error("agent name must not be empty")]
    EmptyName,

    #[error("cannot guess the opponent's move on the agent's own turn")]
    OwnTurn,

    #[error("evaluator expects a {expected_width}x{expected_height} board, got {width}x{height}")]
    BoardSizeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid exploration noise: {0}")]
    Noise(String),

    #[error("exploration level must be positive and finite, got {0}")]
    InvalidExplorationLevel(f64),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Display name and seat of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    name: String,
    color: Player,
}

impl AgentInfo {
    /// Fails with [`AgentError::EmptyName`] for a blank name.
    pub fn new(name: impl Into<String>, color: Player) -> Result<Self, AgentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AgentError::EmptyName);
        }
        Ok(Self { name, color })
    }

    /// The name shown in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The color this agent plays.
    pub fn color(&self) -> Player {
        self.color
    }

    /// Assigns the color this agent plays.
    pub fn set_color(&mut self, color: Player) {
        self.color = color;
    }

    /// Changes the name, with the same check as [`new`](Self::new).
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), AgentError> {
        *self = AgentInfo::new(name, self.color)?;
        Ok(())
    }

    /// Fails unless it is this agent's turn on `board`.
    pub fn check_turn(&self, board: &Board) -> Result<(), AgentError> {
        let actual = board.current_player();
        if actual != self.color {
            return Err(AgentError::TurnOrder {
                expected: self.color,
                actual,
            });
        }
        Ok(())
    }
}

/// Anything that can take a seat in a game.
pub trait Agent {
    /// Chooses a legal move for the player to move, who must be this agent.
    fn get_action(&mut self, board: &Board) -> Result<Move, AgentError>;

    fn info(&self) -> &AgentInfo;

    fn set_color(&mut self, color: Player);

    /// Forgets everything learned about the current game.
    fn reset(&mut self);

    fn color(&self) -> Player {
        self.info().color()
    }

    fn name(&self) -> &str {
        self.info().name()
    }
}

/// Dirichlet exploration noise mixed into self-play move probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirichletNoise {
    alpha: f64,
    epsilon: f64,
}

impl Default for DirichletNoise {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            epsilon: 0.25,
        }
    }
}

impl DirichletNoise {
    pub fn new(alpha: f64, epsilon: f64) -> Result<Self, AgentError> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(AgentError::Noise(format!("alpha must be positive, got {alpha}")));
        }
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(AgentError::Noise(format!(
                "epsilon must be in [0, 1], got {epsilon}"
            )));
        }
        Ok(Self { alpha, epsilon })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Draws `n` weights from `Dir(alpha, ..., alpha)` by normalizing Gamma variates.
    pub fn sample<K: RandomGenerator>(&self, n: usize, random: &mut K) -> Result<Vec<f64>, AgentError> {
        let gamma = Gamma::new(self.alpha, 1.0).map_err(|e| AgentError::Noise(e.to_string()))?;
        let mut noise: Vec<f64> = (0..n).map(|_| gamma.sample(random.source())).collect();

        let sum: f64 = noise.iter().sum();
        if sum > 0.0 {
            for x in &mut noise {
                *x /= sum;
            }
        }
        Ok(noise)
    }

    /// `(1 - epsilon) * p + epsilon * Dir(alpha)` over the distribution's moves.
    pub fn apply<K: RandomGenerator>(
        &self,
        distribution: &MoveDistribution,
        random: &mut K,
    ) -> Result<MoveDistribution, AgentError> {
        let noise = self.sample(distribution.len(), random)?;
        Ok(distribution.mixed_with(&noise, self.epsilon))
    }
}

/// Plays with [`PureSearchEngine`], reusing its tree across the game.
pub struct PureMctsAgent<K: RandomGenerator = StandardRandomGenerator> {
    info: AgentInfo,
    engine: PureSearchEngine<K>,
}

impl<K: RandomGenerator> PureMctsAgent<K> {
    pub fn new(info: AgentInfo, engine: PureSearchEngine<K>) -> Self {
        Self { info, engine }
    }

    pub fn engine(&self) -> &PureSearchEngine<K> {
        &self.engine
    }

    /// Predicts the opponent's reply with a `1 / decay_level` share of the budget.
    /// Only valid while the opponent is to move.
    pub fn guess_next(&mut self, board: &Board, decay_level: u32) -> Result<Move, AgentError> {
        if board.current_player() == self.info.color() {
            return Err(AgentError::OwnTurn);
        }
        Ok(self.engine.think(board, decay_level)?)
    }

    /// Brings the tree in step with `board` before a search.
    fn sync_with(&mut self, board: &Board) {
        match board.last_move() {
            Some(mv) => {
                self.engine.update_with_move(mv);
            }
            None => self.engine.reset(),
        }
    }
}

impl<K: RandomGenerator> Agent for PureMctsAgent<K> {
    fn get_action(&mut self, board: &Board) -> Result<Move, AgentError> {
        self.info.check_turn(board)?;
        self.sync_with(board);
        let mv = self.engine.get_move(board)?;
        self.engine.update_with_move(mv);
        debug!(agent = self.info.name(), mv, "pure agent moved");
        Ok(mv)
    }

    fn info(&self) -> &AgentInfo {
        &self.info
    }

    fn set_color(&mut self, color: Player) {
        self.info.set_color(color);
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}

/// Plays with [`GuidedSearchEngine`] and samples its move from the visit distribution.
///
/// In self-play mode the agent plays both colors, so its tree already follows every move
/// it made and is only advanced once per move; Dirichlet noise is mixed into the
/// distribution before sampling.
pub struct GuidedMctsAgent<E: Evaluator, K: RandomGenerator = StandardRandomGenerator> {
    info: AgentInfo,
    engine: GuidedSearchEngine<E, K>,
    exploration_level: f64,
    self_play: bool,
    noise: DirichletNoise,
}

impl<E: Evaluator, K: RandomGenerator> GuidedMctsAgent<E, K> {
    pub fn new(info: AgentInfo, engine: GuidedSearchEngine<E, K>) -> Self {
        Self {
            info,
            engine,
            exploration_level: DEFAULT_EXPLORATION_LEVEL,
            self_play: false,
            noise: DirichletNoise::default(),
        }
    }

    pub fn with_exploration_level(mut self, level: f64) -> Result<Self, AgentError> {
        if !(level.is_finite() && level > 0.0) {
            return Err(AgentError::InvalidExplorationLevel(level));
        }
        self.exploration_level = level;
        Ok(self)
    }

    pub fn with_self_play(mut self, self_play: bool) -> Self {
        self.self_play = self_play;
        self
    }

    pub fn with_noise(mut self, noise: DirichletNoise) -> Self {
        self.noise = noise;
        self
    }

    pub fn set_self_play(&mut self, self_play: bool) {
        self.self_play = self_play;
    }

    pub fn is_self_play(&self) -> bool {
        self.self_play
    }

    pub fn exploration_level(&self) -> f64 {
        self.exploration_level
    }

    pub fn engine(&self) -> &GuidedSearchEngine<E, K> {
        &self.engine
    }

    /// Chooses a move and also returns the search's move probabilities as a dense vector
    /// with one entry per cell, which is what self-play records as the policy target.
    pub fn get_action_with_policy(&mut self, board: &Board) -> Result<(Move, Vec<f32>), AgentError> {
        self.info.check_turn(board)?;
        self.check_board_size(board)?;

        if !self.self_play {
            self.sync_with(board);
        }

        let distribution = self.engine.get_move(board, self.exploration_level)?;
        let choice = if self.self_play {
            let noisy = self.noise.apply(&distribution, self.engine.random_mut())?;
            noisy.sample(self.engine.random_mut())
        } else {
            distribution.sample(self.engine.random_mut())
        };
        let mv = choice.ok_or(SearchError::NoCandidateMoves)?;
        self.engine.update_with_move(mv);

        debug!(
            agent = self.info.name(),
            mv,
            probability = distribution.probability_of(mv),
            self_play = self.self_play,
            "guided agent moved"
        );
        Ok((mv, distribution.to_policy_vector(board.cell_count())))
    }

    /// Advances the tree past the opponent's reply, so the root matches `board` before
    /// the search starts.
    fn sync_with(&mut self, board: &Board) {
        match board.last_move() {
            Some(mv) => {
                self.engine.update_with_move(mv);
            }
            None => self.engine.reset(),
        }
    }

    fn check_board_size(&self, board: &Board) -> Result<(), AgentError> {
        match self.engine.evaluator().board_size() {
            Some((expected_width, expected_height))
                if (expected_width, expected_height) != (board.width(), board.height()) =>
            {
                Err(AgentError::BoardSizeMismatch {
                    expected_width,
                    expected_height,
                    width: board.width(),
                    height: board.height(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl<E: Evaluator, K: RandomGenerator> Agent for GuidedMctsAgent<E, K> {
    fn get_action(&mut self, board: &Board) -> Result<Move, AgentError> {
        self.get_action_with_policy(board).map(|(mv, _)| mv)
    }

    fn info(&self) -> &AgentInfo {
        &self.info
    }

    fn set_color(&mut self, color: Player) {
        self.info.set_color(color);
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}
