//! Move-generator check by leaf counting.

use crate::board::Board;
use crate::flip;

/// Executes a perft run starting from the standard initial position.
///
/// # Arguments
///
/// * `depth` - Number of plies to expand from the initial position. A depth of
///   `1` counts the immediate legal moves; larger values walk the tree
///   recursively.
///
/// # Returns
///
/// The total number of leaves. A pass does not consume depth, and a finished
/// game counts as one leaf.
pub fn perft_root(depth: u32) -> u64 {
    perft(&Board::new(), depth)
}

/// Counts the leaves below `board`, with the same conventions as [`perft_root`].
pub fn perft(board: &Board, depth: u32) -> u64 {
    let moves = board.get_moves();
    if moves.is_empty() {
        let next = board.switch_players();
        return if next.has_legal_moves() {
            perft(&next, depth)
        } else {
            1
        };
    }

    if depth <= 1 {
        return moves.count() as u64;
    }

    moves
        .iter()
        .map(|sq| {
            let flipped = flip::flip(sq, board.player, board.opponent);
            perft(&board.make_move_with_flipped(flipped, sq), depth - 1)
        })
        .sum()
}
