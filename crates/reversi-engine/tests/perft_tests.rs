use reversi_engine::board::Board;
use reversi_engine::perft::{perft, perft_root};

#[test]
fn test_perft() {
    let nodes = perft_root(9);
    assert_eq!(nodes, 3_005_320);
}

#[test]
fn test_perft_symmetric_openings() {
    let board = Board::new();
    let counts: Vec<u64> = board
        .get_moves()
        .iter()
        .map(|sq| perft(&board.make_move(sq), 5))
        .collect();
    assert!(counts.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(counts.iter().sum::<u64>(), perft_root(6));
}
