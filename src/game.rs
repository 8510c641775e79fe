//! Running games between agents, and self-play data collection.

use crate::agent::{Agent, AgentError, GuidedMctsAgent};
use crate::board::{Board, GameOutcome, Move, Player};
use crate::evaluator::Evaluator;
use crate::random::RandomGenerator;
use ndarray::Array3;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("both agents play {0}")]
    SameColor(Player),

    #[error("{name} chose move {mv}, which is not available")]
    InvalidMove { name: String, mv: Move },

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// The moves of a finished game and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub moves: Vec<Move>,
    pub outcome: GameOutcome,
}

/// One position seen during self-play.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    /// `Board::current_state` before the move was played.
    pub state: Array3<f32>,
    /// Search probabilities over every cell.
    pub policy: Vec<f32>,
    /// The player to move in `state`.
    pub player: Player,
    /// Final result for `player`: 1 win, -1 loss, 0 draw.
    pub value: f32,
}

#[derive(Debug, Clone)]
pub struct SelfPlayRecord {
    pub outcome: GameOutcome,
    pub samples: Vec<TrainingSample>,
}

/// Plays games to completion without any user interaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameServer {
    show_board: bool,
}

impl GameServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the board after every move at debug level.
    pub fn with_board_logging(mut self, show_board: bool) -> Self {
        self.show_board = show_board;
        self
    }

    /// Plays `first` against `second` on a cleared `board`. `first` moves first with
    /// whatever color it holds.
    pub fn play_match(
        &self,
        board: &mut Board,
        first: &mut dyn Agent,
        second: &mut dyn Agent,
    ) -> Result<GameRecord, GameError> {
        if first.color() == second.color() {
            return Err(GameError::SameColor(first.color()));
        }
        board.reset(first.color());
        first.reset();
        second.reset();

        loop {
            let agent: &mut dyn Agent = if board.current_player() == first.color() {
                &mut *first
            } else {
                &mut *second
            };
            let mv = agent.get_action(board)?;
            if !board.play(mv) {
                return Err(GameError::InvalidMove {
                    name: agent.name().to_string(),
                    mv,
                });
            }
            self.log_board(board);

            let outcome = board.game_end();
            if outcome.is_over() {
                match outcome.winner() {
                    Some(winner) => {
                        let name = if winner == first.color() {
                            first.name()
                        } else {
                            second.name()
                        };
                        info!(%winner, name, moves = board.moves().len(), "game finished");
                    }
                    None => info!(moves = board.moves().len(), "game finished in a draw"),
                }
                return Ok(GameRecord {
                    moves: board.moves().to_vec(),
                    outcome,
                });
            }
        }
    }

    /// Lets `agent` play both colors, starting with black, and records a training sample
    /// for every move. The agent is switched to self-play mode and reset afterwards.
    pub fn self_play<E: Evaluator, K: RandomGenerator>(
        &self,
        board: &mut Board,
        agent: &mut GuidedMctsAgent<E, K>,
    ) -> Result<SelfPlayRecord, GameError> {
        board.reset(Player::Black);
        agent.reset();
        agent.set_self_play(true);
        agent.set_color(Player::Black);

        let mut positions: Vec<(Array3<f32>, Vec<f32>, Player)> = Vec::new();
        let outcome = loop {
            let (mv, policy) = agent.get_action_with_policy(board)?;
            positions.push((board.current_state(), policy, board.current_player()));
            if !board.play(mv) {
                return Err(GameError::InvalidMove {
                    name: agent.name().to_string(),
                    mv,
                });
            }
            self.log_board(board);
            agent.set_color(board.current_player());

            let outcome = board.game_end();
            if outcome.is_over() {
                break outcome;
            }
        };
        agent.reset();

        let samples = positions
            .into_iter()
            .map(|(state, policy, player)| TrainingSample {
                state,
                policy,
                player,
                value: outcome.value_for(player) as f32,
            })
            .collect::<Vec<_>>();
        info!(
            winner = ?outcome.winner(),
            samples = samples.len(),
            "self-play game finished"
        );
        Ok(SelfPlayRecord { outcome, samples })
    }

    fn log_board(&self, board: &Board) {
        if self.show_board {
            debug!("\n{board}");
        }
    }
}
