use rand::SeedableRng;
use rand::rngs::StdRng;
use reversi_engine::board::Board;
use reversi_engine::disc::Disc;
use reversi_engine::search::endgame::Solver;
use reversi_engine::search::options::SolverOptions;
use reversi_engine::transposition_table::TableOptions;
use reversi_engine::types::Score;

/// Plain alpha-beta with no table and no move ordering.
fn reference_solve(board: &Board, mut alpha: Score, beta: Score) -> Score {
    let moves = board.get_moves();
    if moves.is_empty() {
        let passed = board.switch_players();
        if passed.has_legal_moves() {
            return -reference_solve(&passed, -beta, -alpha);
        }
        return board.terminal_score();
    }

    let mut best = -65;
    for sq in moves.iter() {
        let score = -reference_solve(&board.make_move(sq), -beta, -alpha);
        if score > best {
            best = score;
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    break;
                }
            }
        }
    }
    best
}

fn reference_score(board: &Board) -> Score {
    reference_solve(board, -64, 64)
}

#[test]
fn test_solve_5() {
    let board = Board::from_string(
        "--O--O----OOOOO-XOOOOOOOXXOOXOOOXXXXXOXXXOXXOOXXXXXXOXOXXOOOOOOX",
        Disc::Black,
    )
    .unwrap();
    let mut solver = Solver::default();

    assert_eq!(solver.solve(&board), 27);
}

#[test]
fn test_solve_15() {
    let board = Board::from_string(
        "--OXXO--XOXXXX--XOOOOXXXXOOOXXXXX-OOOXXX--OOOOXX--XXOOO----XXOO-",
        Disc::Black,
    )
    .unwrap();
    let mut solver = Solver::default();

    assert_eq!(solver.solve(&board), 8);
}

#[test]
fn test_matches_reference_on_random_positions() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut solver = Solver::default();

    for n_empties in 1..=10 {
        let trials = if n_empties <= 6 { 40 } else { 8 };
        for _ in 0..trials {
            let board = Board::random_position(n_empties, &mut rng);
            assert_eq!(
                solver.solve(&board),
                reference_score(&board),
                "{n_empties} empties\n{}",
                board.to_string_as_board(Disc::Black)
            );
        }
    }
}

#[test]
fn test_score_is_best_child() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut solver = Solver::default();

    for _ in 0..10 {
        let board = Board::random_position(8, &mut rng);
        let moves = board.get_moves();
        if moves.is_empty() {
            continue;
        }
        let best_child = moves
            .iter()
            .map(|sq| -solver.solve(&board.make_move(sq)))
            .max()
            .unwrap();
        assert_eq!(solver.solve(&board), best_child);
    }
}

#[test]
fn test_terminal_positions() {
    let mut solver = Solver::default();

    let board = Board::from_bitboards(0x0000_00ff_ffff_ffffu64, 0xffff_ff00_0000_0000u64);
    assert_eq!(solver.solve(&board), 40 - 24);

    // Nobody can move while empties remain; they go to neither side.
    let board = Board::from_bitboards(0x0000_0000_00ff_ffffu64, 0u64);
    assert!(board.is_game_over());
    assert_eq!(solver.solve(&board), 24);
    assert_eq!(solver.solve(&board.switch_players()), -24);
}

#[test]
fn test_few_empties_fast_paths() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut solver = Solver::default();

    for n_empties in 1..=3 {
        for _ in 0..100 {
            let board = Board::random_position(n_empties, &mut rng);
            assert_eq!(solver.solve(&board), reference_score(&board));
            for (alpha, beta) in [(-64, 64), (-1, 1), (0, 1), (10, 20)] {
                let score = solver.solve_window(&board, alpha, beta);
                let exact = reference_score(&board);
                if exact <= alpha {
                    assert!(score <= alpha);
                } else if exact >= beta {
                    assert!(score >= beta);
                } else {
                    assert_eq!(score, exact);
                }
            }
        }
    }
}

#[test]
fn test_idempotent_cold_and_warm() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut solver = Solver::default();

    for _ in 0..6 {
        let board = Board::random_position(12, &mut rng);
        let first = solver.solve(&board);
        assert_eq!(solver.solve(&board), first);

        solver.clear();
        assert_eq!(solver.solve(&board), first);
    }
}

#[test]
fn test_window_bounds() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut solver = Solver::default();

    for _ in 0..8 {
        let board = Board::random_position(11, &mut rng);
        solver.clear();
        let exact = solver.solve(&board);

        for (alpha, beta) in [(exact - 1, exact + 1), (exact, exact + 1), (exact - 1, exact)] {
            let (alpha, beta) = (alpha.max(-64), beta.min(64));
            if alpha >= beta {
                continue;
            }
            solver.clear();
            let score = solver.solve_window(&board, alpha, beta);
            if exact <= alpha {
                assert!(score <= alpha);
            } else if exact >= beta {
                assert!(score >= beta);
            } else {
                assert_eq!(score, exact);
            }
        }
    }
}

#[test]
fn test_canonical_table_agrees() {
    let mut rng = StdRng::seed_from_u64(77);
    let options = SolverOptions::default().with_table(TableOptions::default().with_canonical(true));
    let mut canonical = Solver::new(options);
    let mut plain = Solver::default();

    for _ in 0..6 {
        let board = Board::random_position(12, &mut rng);
        assert_eq!(canonical.solve(&board), plain.solve(&board));
    }
}

#[test]
fn test_solve_with_move_10_empties() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut solver = Solver::default();

    let mut checked = 0;
    while checked < 5 {
        let board = Board::random_position(10, &mut rng);
        if !board.has_legal_moves() {
            continue;
        }
        let result = solver.solve_with_move(&board).unwrap();
        assert!(board.is_legal_move(result.best_move));
        assert!((-64..=64).contains(&result.score));
        assert_eq!(result.score, reference_score(&board));
        assert_eq!(-solver.solve(&board.make_move(result.best_move)), result.score);
        checked += 1;
    }
}
