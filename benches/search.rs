//! Search benchmarks.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - The incremental win check on a crowded board
//! - Pure (rollout) search with varying budgets
//! - Guided search with the uniform evaluator

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gomoku_mcts::board::Board;
use gomoku_mcts::config::SearchConfig;
use gomoku_mcts::engines::guided::GuidedSearchEngine;
use gomoku_mcts::engines::pure::PureSearchEngine;
use gomoku_mcts::evaluator::UniformEvaluator;
use gomoku_mcts::random::SeededRandomGenerator;

/// A 15x15 midgame position with no completed line.
fn midgame() -> Board {
    let mut board = Board::default();
    for mv in [112, 113, 97, 127, 98, 126, 82, 142, 111, 96, 128, 141, 83, 68, 99, 114] {
        board.play(mv);
    }
    board
}

fn bench_game_end(c: &mut Criterion) {
    let board = midgame();
    c.bench_function("game_end_midgame", |b| b.iter(|| black_box(board.game_end())));
}

fn bench_pure_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("pure_search");
    group.sample_size(10);
    let board = midgame();

    for budget in [100u32, 400, 1600] {
        group.throughput(Throughput::Elements(u64::from(budget)));
        group.bench_with_input(BenchmarkId::new("15x15", budget), &budget, |b, &budget| {
            b.iter(|| {
                let config = SearchConfig::for_pure().with_compute_budget(budget);
                let mut engine =
                    PureSearchEngine::with_random_generator(config, SeededRandomGenerator::new(42))
                        .unwrap();
                black_box(engine.get_move(&board).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_guided_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("guided_search");
    let board = midgame();

    for budget in [400u32, 1600] {
        group.throughput(Throughput::Elements(u64::from(budget)));
        group.bench_with_input(BenchmarkId::new("uniform", budget), &budget, |b, &budget| {
            b.iter(|| {
                let config = SearchConfig::for_guided().with_compute_budget(budget);
                let mut engine = GuidedSearchEngine::with_random_generator(
                    UniformEvaluator::new(),
                    config,
                    SeededRandomGenerator::new(42),
                )
                .unwrap();
                black_box(engine.get_move(&board, 1.0).unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_game_end, bench_pure_search, bench_guided_search);
criterion_main!(benches);
