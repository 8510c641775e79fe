//! Plays a rollout-engine match and a self-play game on a small board.
//!
//! Run with `RUST_LOG=gomoku_mcts=debug cargo run --example self_play` to watch the search.

use gomoku_mcts::agent::{AgentInfo, GuidedMctsAgent, PureMctsAgent};
use gomoku_mcts::board::{Board, Player};
use gomoku_mcts::config::SearchConfig;
use gomoku_mcts::engines::guided::GuidedSearchEngine;
use gomoku_mcts::engines::pure::PureSearchEngine;
use gomoku_mcts::evaluator::UniformEvaluator;
use gomoku_mcts::game::GameServer;
use gomoku_mcts::random::SeededRandomGenerator;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gomoku_mcts=info")),
        )
        .init();

    let mut board = Board::new(6, 6, 4)?;
    let server = GameServer::new().with_board_logging(true);

    // Two rollout engines with different seeds
    let config = SearchConfig::for_pure().with_compute_budget(400);
    let mut black = PureMctsAgent::new(
        AgentInfo::new("rollouts-1", Player::Black)?,
        PureSearchEngine::with_random_generator(config.clone(), SeededRandomGenerator::new(1))?,
    );
    let mut white = PureMctsAgent::new(
        AgentInfo::new("rollouts-2", Player::White)?,
        PureSearchEngine::with_random_generator(config, SeededRandomGenerator::new(2))?,
    );
    let record = server.play_match(&mut board, &mut black, &mut white)?;
    println!("{board}");
    println!("match: {:?} after {} moves", record.outcome, record.moves.len());

    // One guided agent playing both sides
    let engine = GuidedSearchEngine::with_random_generator(
        UniformEvaluator::new(),
        SearchConfig::for_guided().with_compute_budget(200),
        SeededRandomGenerator::new(3),
    )?;
    let mut agent = GuidedMctsAgent::new(AgentInfo::new("zero", Player::Black)?, engine);
    let game = server.self_play(&mut board, &mut agent)?;
    println!("{board}");
    println!(
        "self-play: {:?}, {} training samples",
        game.outcome,
        game.samples.len()
    );
    for (i, sample) in game.samples.iter().enumerate().take(4) {
        let best = sample
            .policy
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(mv, _)| mv);
        println!(
            "  sample {i}: {} to move, top move {best:?}, z = {}",
            sample.player, sample.value
        );
    }

    Ok(())
}
