use gomoku_mcts::agent::{Agent, AgentError, AgentInfo, GuidedMctsAgent, PureMctsAgent};
use gomoku_mcts::board::{Board, GameOutcome, Move, Player};
use gomoku_mcts::config::SearchConfig;
use gomoku_mcts::engines::guided::GuidedSearchEngine;
use gomoku_mcts::engines::pure::PureSearchEngine;
use gomoku_mcts::evaluator::{Evaluation, Evaluator, EvaluatorError};
use gomoku_mcts::game::GameServer;
use gomoku_mcts::random::SeededRandomGenerator;

/// Prefers cells near the middle of the board and has no opinion on the value.
struct CenterEvaluator {
    width: usize,
    height: usize,
}

impl Evaluator for CenterEvaluator {
    fn evaluate(&mut self, board: &Board) -> Result<Evaluation, EvaluatorError> {
        let (cr, cc) = ((self.height - 1) as f64 / 2.0, (self.width - 1) as f64 / 2.0);
        let weights: Vec<(Move, f64)> = board
            .available_moves()
            .iter()
            .filter_map(|&mv| {
                let loc = board.move_to_location(mv)?;
                let distance = (loc.row as f64 - cr).abs() + (loc.col as f64 - cc).abs();
                Some((mv, 1.0 / (1.0 + distance)))
            })
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(EvaluatorError::EvaluationFailed("no moves to weigh".to_string()));
        }
        Ok(Evaluation {
            priors: weights.into_iter().map(|(mv, w)| (mv, w / total)).collect(),
            value: 0.0,
        })
    }

    fn board_size(&self) -> Option<(usize, usize)> {
        Some((self.width, self.height))
    }
}

fn pure_agent(name: &str, color: Player, seed: u64) -> PureMctsAgent<SeededRandomGenerator> {
    let config = SearchConfig::for_pure().with_compute_budget(300);
    PureMctsAgent::new(
        AgentInfo::new(name, color).unwrap(),
        PureSearchEngine::with_random_generator(config, SeededRandomGenerator::new(seed)).unwrap(),
    )
}

#[test]
fn rollout_agents_play_a_full_game() {
    // arrange
    let mut board = Board::new(5, 5, 4).unwrap();
    let mut black = pure_agent("black", Player::Black, 1);
    let mut white = pure_agent("white", Player::White, 2);

    // act
    let record = GameServer::new()
        .play_match(&mut board, &mut black, &mut white)
        .unwrap();

    // assert
    assert_eq!(record.outcome, board.game_end());
    assert!(record.outcome.is_over());
    assert_eq!(record.moves[0], 12);
    let mut replay = Board::new(5, 5, 4).unwrap();
    for (i, &mv) in record.moves.iter().enumerate() {
        let expected = if i % 2 == 0 { Player::Black } else { Player::White };
        assert_eq!(replay.current_player(), expected);
        assert!(replay.play(mv));
    }
    assert_eq!(replay.game_end(), record.outcome);
}

#[test]
fn rollout_agent_completes_its_line() {
    // arrange: black has three in a row on the top row with both ends open
    let mut board = Board::new(6, 6, 4).unwrap();
    for mv in [1, 30, 2, 31, 3, 34] {
        assert!(board.play(mv));
    }
    let mut black = pure_agent("black", Player::Black, 5);

    // act
    let mv = black.get_action(&board).unwrap();

    // assert
    assert!(mv == 0 || mv == 4, "expected a winning move, got {mv}");
    assert!(board.play(mv));
    assert_eq!(board.game_end(), GameOutcome::Win(Player::Black));
}

#[test]
fn agent_out_of_turn_leaves_the_game_untouched() {
    let board = Board::new(5, 5, 4).unwrap();
    let mut white = pure_agent("white", Player::White, 3);

    let result = white.get_action(&board);

    assert!(matches!(result, Err(AgentError::TurnOrder { .. })));
    assert!(board.is_empty());
}

#[test]
fn self_play_with_a_custom_evaluator() {
    // arrange
    let mut board = Board::new(5, 5, 4).unwrap();
    let engine = GuidedSearchEngine::with_random_generator(
        CenterEvaluator {
            width: 5,
            height: 5,
        },
        SearchConfig::for_guided().with_compute_budget(100),
        SeededRandomGenerator::new(9),
    )
    .unwrap();
    let mut agent = GuidedMctsAgent::new(AgentInfo::new("zero", Player::Black).unwrap(), engine);

    // act
    let record = GameServer::new().self_play(&mut board, &mut agent).unwrap();

    // assert
    assert_eq!(record.outcome, board.game_end());
    assert_eq!(record.samples.len(), board.moves().len());
    for (sample, &mv) in record.samples.iter().zip(board.moves()) {
        let total: f32 = sample.policy.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert_eq!(sample.policy.len(), 25);
        assert!(sample.value == 0.0 || sample.value.abs() == 1.0);
        assert!(mv < 25);
    }
    if let Some(winner) = record.outcome.winner() {
        let last = record.samples.last().unwrap();
        assert_eq!(last.player, winner);
        assert_eq!(last.value, 1.0);
    }
}

#[test]
fn guided_agent_refuses_a_foreign_board() {
    let board = Board::new(6, 6, 4).unwrap();
    let engine = GuidedSearchEngine::with_random_generator(
        CenterEvaluator {
            width: 5,
            height: 5,
        },
        SearchConfig::for_guided().with_compute_budget(50),
        SeededRandomGenerator::new(9),
    )
    .unwrap();
    let mut agent = GuidedMctsAgent::new(AgentInfo::new("zero", Player::Black).unwrap(), engine);

    assert!(matches!(
        agent.get_action(&board),
        Err(AgentError::BoardSizeMismatch { .. })
    ));
}

#[test]
fn guided_agent_finishes_games_against_rollouts_from_either_seat() {
    for seed in 1..4 {
        for guided_color in [Player::Black, Player::White] {
            // arrange
            let mut board = Board::new(5, 5, 4).unwrap();
            let engine = GuidedSearchEngine::with_random_generator(
                CenterEvaluator {
                    width: 5,
                    height: 5,
                },
                SearchConfig::for_guided().with_compute_budget(100),
                SeededRandomGenerator::new(seed),
            )
            .unwrap();
            let mut guided =
                GuidedMctsAgent::new(AgentInfo::new("guided", guided_color).unwrap(), engine);
            let mut rollout = pure_agent("rollout", guided_color.opponent(), seed + 10);

            // act
            let record = if guided_color == Player::Black {
                GameServer::new().play_match(&mut board, &mut guided, &mut rollout)
            } else {
                GameServer::new().play_match(&mut board, &mut rollout, &mut guided)
            }
            .unwrap();

            // assert
            assert!(record.outcome.is_over());
            assert_eq!(record.outcome, board.game_end());
            assert!(!guided.is_self_play());
        }
    }
}
