//! The two search engines built on [`MonteCarloTreeSearch`](crate::mcts::MonteCarloTreeSearch).

/// Evaluator-guided search returning a move distribution.
pub mod guided;
/// Rollout search returning a single move.
pub mod pure;
