//! Policy/value evaluator contract.
//!
//! An evaluator looks at a position and returns prior probabilities for the available moves
//! together with a value estimate. In training this is a neural network; the search only
//! depends on the contract below.

use crate::board::{Board, Move};
use crate::policy::uniform_priors;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("value {0} is outside [-1, 1]")]
    ValueOutOfRange(f64),

    #[error("prior {prior} for move {mv} is negative or not finite")]
    InvalidPrior { mv: Move, prior: f64 },
}

/// Result of evaluating a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// `(move, prior)` for the available moves.
    pub priors: Vec<(Move, f64)>,

    /// Expected outcome for the player to move: -1 (certain loss) to +1 (certain win).
    pub value: f64,
}

impl Evaluation {
    /// Rejects values outside `[-1, 1]` and priors that are negative or not finite.
    /// Either would leave NaN or unbounded scores in the tree.
    pub fn checked(self) -> Result<Self, EvaluatorError> {
        if !(self.value.is_finite() && (-1.0..=1.0).contains(&self.value)) {
            return Err(EvaluatorError::ValueOutOfRange(self.value));
        }
        if let Some(&(mv, prior)) = self
            .priors
            .iter()
            .find(|&&(_, prior)| !(prior.is_finite() && prior >= 0.0))
        {
            return Err(EvaluatorError::InvalidPrior { mv, prior });
        }
        Ok(self)
    }
}

/// A policy/value function over boards.
///
/// Must be called with the true position. An implementation that canonicalizes the input
/// (rotation, reflection) has to map the returned priors back before returning them.
pub trait Evaluator {
    fn evaluate(&mut self, board: &Board) -> Result<Evaluation, EvaluatorError>;

    /// The `(width, height)` this evaluator was built for, when it only accepts one size.
    fn board_size(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Uniform priors over the available moves and a neutral value.
/// Useful for exercising the guided search without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&mut self, board: &Board) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation {
            priors: uniform_priors(board),
            value: 0.0,
        })
    }
}
