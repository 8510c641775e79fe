//! Monte Carlo tree search for connect-K board games such as Gomoku.
//!
//! This library provides two search engines over a shared tree-walk:
//!
//! * [`PureSearchEngine`] expands with uniform priors and scores leaves with random rollouts,
//! * [`GuidedSearchEngine`] asks an [`Evaluator`] (for example a policy-value network) for
//!   priors and leaf values and returns a probability distribution over moves.
//!
//! Both keep their search tree between moves, so statistics gathered for the position that
//! was actually reached are reused on the next search.
//!
//! # Example
//!
//! ```rust
//! use gomoku_mcts::board::Board;
//! use gomoku_mcts::config::SearchConfig;
//! use gomoku_mcts::engines::pure::PureSearchEngine;
//! use gomoku_mcts::random::SeededRandomGenerator;
//!
//! // A 6x6 board where four in a row wins
//! let mut board = Board::new(6, 6, 4).unwrap();
//! board.play(14);
//!
//! // Create a rollout engine with a small budget and a fixed seed
//! let config = SearchConfig::for_pure().with_compute_budget(500);
//! let mut engine =
//!     PureSearchEngine::with_random_generator(config, SeededRandomGenerator::default()).unwrap();
//!
//! // Search the position and keep the tree in step with the game
//! let reply = engine.get_move(&board).unwrap();
//! assert!(board.play(reply));
//! engine.update_with_move(reply);
//!
//! println!("white replies with {reply}\n{board}");
//! ```

/// Seat-holding players built on the search engines.
pub mod agent;
/// Contains the connect-K [`Board`](board::Board) and related types.
pub mod board;
/// Search parameters shared by both engines.
pub mod config;
pub mod engines;
pub mod evaluator;
/// Matches between agents and self-play data collection.
pub mod game;
/// The core module of the library, containing the `MonteCarloTreeSearch` implementation.
pub mod mcts;
/// Contains the `MctsNode` struct, which holds the statistics of a tree node.
pub mod mcts_node;
pub mod policy;
/// Contains traits and implementations for random number generation.
pub mod random;
/// The arena-backed search tree.
pub mod search_tree;

pub use board::{Board, GameOutcome, Move, Player};
pub use config::SearchConfig;
pub use engines::guided::{GuidedSearchEngine, MoveDistribution};
pub use engines::pure::PureSearchEngine;
pub use evaluator::{Evaluation, Evaluator};
pub use mcts::SearchError;
