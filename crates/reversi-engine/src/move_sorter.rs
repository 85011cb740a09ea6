//! Move ordering for the endgame solver.
//!
//! A [`MoveSorter`] scores every legal move of a node with cheap heuristics and
//! keeps them ordered best first. With enhanced transposition cutoff (ETC), each
//! child is also probed in the endgame table so that a proven refutation can end
//! the node before any move is searched.
//!
//! Reference: <https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/move.c>

use arrayvec::ArrayVec;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::empty_list::EmptyList;
use crate::flip;
use crate::square::Square;
use crate::transposition_table::EndgameTable;
use crate::types::{Score, ScoredMove};

/// Maximum number of moves possible in a Reversi position.
pub const MAX_MOVES: usize = 34;

/// Value assigned to wipeout moves (capturing all opponent discs).
const WIPEOUT_VALUE: i32 = 1 << 30;

/// Value assigned to moves whose child is already proven to fail low.
const FAIL_LOW_VALUE: i32 = -(1 << 30);

/// Reference: https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/move.c#L30
#[rustfmt::skip]
const SQUARE_VALUE: [i32; 64] = [
    18,  4, 16, 12, 12, 16,  4, 18,
     4,  2,  6,  8,  8,  6,  2,  4,
    16,  6, 14, 10, 10, 14,  6, 16,
    12,  8, 10,  0,  0, 10,  8, 12,
    12,  8, 10,  0,  0, 10,  8, 12,
    16,  6, 14, 10, 10, 14,  6, 16,
     4,  2,  6,  8,  8,  6,  2,  4,
    18,  4, 16, 12, 12, 16,  4, 18,
];

const SQUARE_VALUE_WEIGHT: i32 = 1 << 8;
const OWN_POTENTIAL_MOBILITY_WEIGHT: i32 = 1 << 8;
const POTENTIAL_MOBILITY_WEIGHT: i32 = 1 << 10;
const PARITY_WEIGHT: i32 = 1 << 12;
const MOBILITY_WEIGHT: i32 = 1 << 14;

/// A legal move with the data needed to play and order it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SorterMove {
    /// The square where the disc is placed.
    pub sq: Square,
    /// Ordering score (higher = searched earlier).
    pub score: i32,
    /// Opponent discs flipped by this move.
    pub flips: Bitboard,
    /// The opponent's legal moves after this move.
    pub enemy_moves: Bitboard,
}

/// Legal moves of one node, ordered by descending score.
///
/// The solver keeps one sorter per empty count and refills it at every node of
/// that depth.
#[derive(Clone, Debug, Default)]
pub struct MoveSorter {
    moves: ArrayVec<SorterMove, MAX_MOVES>,
}

impl MoveSorter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns a copy of the `i`-th move in search order.
    #[inline(always)]
    pub fn get(&self, i: usize) -> SorterMove {
        self.moves[i]
    }

    #[cfg(test)]
    pub fn iter(&self) -> std::slice::Iter<'_, SorterMove> {
        self.moves.iter()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Inserts a move after every move with a greater or equal score.
    ///
    /// Moves with equal scores therefore keep their insertion order.
    #[inline]
    pub fn insert(&mut self, mv: SorterMove) {
        debug_assert!(!self.moves.is_full());
        let pos = self
            .moves
            .iter()
            .position(|m| m.score < mv.score)
            .unwrap_or(self.moves.len());
        self.moves.insert(pos, mv);
    }

    /// Fills the sorter with the legal moves of `board`.
    ///
    /// # Arguments
    ///
    /// * `empties` - The empty squares of `board`, with their region parity.
    /// * `board` - The position to order.
    /// * `moves_to_check` - Squares worth trying. Pass [`Bitboard::ALL`] when the
    ///   legal moves are not known yet.
    pub fn create_without_etc(&mut self, empties: &EmptyList, board: &Board, moves_to_check: Bitboard) {
        self.clear();
        for sq in empties.iter() {
            if !moves_to_check.contains(sq) {
                continue;
            }
            let flips = flip::flip(sq, board.player, board.opponent);
            if flips.is_empty() {
                continue;
            }
            let next = board.make_move_with_flipped(flips, sq);
            let mv = score_move(empties, board, &next, sq, flips);
            self.insert(mv);
        }
    }

    /// Fills the sorter like [`create_without_etc`](Self::create_without_etc),
    /// probing each child in `table` on the way.
    ///
    /// # Returns
    ///
    /// `Some` with the move and its proven lower bound if a child's stored upper
    /// bound already refutes the node (`-max >= beta`). The sorter is then only
    /// partially filled. `None` once every move has been ordered; moves whose
    /// child is proven to fail low (`-min <= alpha`) are ordered last.
    pub fn create_with_etc(
        &mut self,
        empties: &EmptyList,
        board: &Board,
        moves_to_check: Bitboard,
        table: &EndgameTable,
        alpha: Score,
        beta: Score,
    ) -> Option<ScoredMove> {
        self.clear();
        for sq in empties.iter() {
            if !moves_to_check.contains(sq) {
                continue;
            }
            let flips = flip::flip(sq, board.player, board.opponent);
            if flips.is_empty() {
                continue;
            }
            let next = board.make_move_with_flipped(flips, sq);
            let mut mv = score_move(empties, board, &next, sq, flips);

            if let Some(entry) = table.find(&next) {
                if -entry.max >= beta {
                    return Some(ScoredMove::new(sq, -entry.max));
                }
                if -entry.min <= alpha {
                    mv.score = FAIL_LOW_VALUE;
                }
            }
            self.insert(mv);
        }
        None
    }
}

/// Scores a move for ordering.
///
/// Rewards moves that leave the opponent few moves and few frontier squares,
/// keep the mover's own options open and play into odd regions.
#[inline]
fn score_move(empties: &EmptyList, board: &Board, next: &Board, sq: Square, flips: Bitboard) -> SorterMove {
    let enemy_moves = next.get_moves();
    let score = if flips == board.opponent {
        WIPEOUT_VALUE
    } else {
        let weighted_mobility = enemy_moves.corner_weighted_count() as i32;
        let potential_mobility = next.get_potential_moves().corner_weighted_count() as i32;
        let own_potential_mobility = next.opponent.get_potential_moves(next.player).count() as i32;
        let mut value = SQUARE_VALUE[sq.index()] * SQUARE_VALUE_WEIGHT;
        value += (36 - weighted_mobility) * MOBILITY_WEIGHT;
        value += (36 - potential_mobility) * POTENTIAL_MOBILITY_WEIGHT;
        value += own_potential_mobility * OWN_POTENTIAL_MOBILITY_WEIGHT;
        if empties.is_odd_region(sq) {
            value += PARITY_WEIGHT;
        }
        value
    };

    SorterMove {
        sq,
        score,
        flips,
        enemy_moves,
    }
}
