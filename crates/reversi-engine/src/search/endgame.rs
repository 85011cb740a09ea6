//! Exact endgame solver.
//!
//! Fail-soft negamax alpha-beta to the end of the game. Scores are final disc
//! differentials from the side to move's point of view; squares left empty when
//! neither side can move are not awarded to anyone.
//!
//! The search gets more elaborate as the number of empties grows:
//!
//! - 1 to 3 empties: closed forms and fixed-order loops.
//! - below `min_parity_depth`: empties visited in the static [`EmptyList`] order.
//! - from `min_parity_depth`: squares in odd regions first.
//! - from `min_sort_depth`: full move sorting, with the table probed and updated
//!   from `min_hash_depth`.
//! - from `min_etc_depth`: enhanced transposition cutoff while sorting.
//! - from `min_negascout_depth`: zero-window probes for every move after the first.

use tracing::debug;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::constants::{BOARD_SQUARES, SCORE_INF, SCORE_MAX, SCORE_MIN};
use crate::empty_list::EmptyList;
use crate::flip;
use crate::move_sorter::MoveSorter;
use crate::search::SearchError;
use crate::search::options::SolverOptions;
use crate::search::search_result::MoveScore;
use crate::square::Square;
use crate::transposition_table::EndgameTable;
use crate::types::{Depth, Score};

/// Returned by a mover-only search when the side to move has no legal move.
const NO_MOVE: Score = -SCORE_INF;

/// Reusable endgame solver.
///
/// A solver owns its table, its list of empties and one move sorter per empty
/// count. It can solve any number of positions, one at a time.
pub struct Solver {
    options: SolverOptions,
    table: EndgameTable,
    empties: EmptyList,
    sorters: Vec<MoveSorter>,
    n_nodes: u64,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverOptions::default())
    }
}

impl Solver {
    pub fn new(options: SolverOptions) -> Self {
        Solver {
            table: EndgameTable::new(options.table),
            options,
            empties: EmptyList::new(&Board::new()),
            sorters: vec![MoveSorter::new(); BOARD_SQUARES + 1],
            n_nodes: 0,
        }
    }

    /// Solves a position exactly.
    ///
    /// # Returns
    ///
    /// The final disc differential under perfect play, from the side to move's
    /// point of view.
    pub fn solve(&mut self, board: &Board) -> Score {
        self.solve_window(board, SCORE_MIN, SCORE_MAX)
    }

    /// Solves a position with a fail-soft window.
    ///
    /// With `pp` the perfect-play value, the result `r` satisfies:
    ///
    /// - `pp >= r >= beta` if `pp >= beta`
    /// - `r == pp` if `alpha < pp < beta`
    /// - `alpha >= r >= pp` if `pp <= alpha`
    ///
    /// # Arguments
    ///
    /// * `board` - The position to solve.
    /// * `alpha`, `beta` - The window, with `-64 <= alpha < beta <= 64`.
    pub fn solve_window(&mut self, board: &Board, alpha: Score, beta: Score) -> Score {
        debug_assert!(SCORE_MIN <= alpha && alpha < beta && beta <= SCORE_MAX);
        self.prepare(board);
        let n_empties = self.empties.count;
        let score = self.solve_node(board, alpha, beta, n_empties);
        debug!(n_empties, alpha, beta, score, n_nodes = self.n_nodes, "endgame solve finished");
        score
    }

    /// Solves a position and returns the best move.
    ///
    /// # Returns
    ///
    /// The best move and its exact score, or [`SearchError::NoLegalMove`] if the
    /// side to move must pass.
    pub fn solve_with_move(&mut self, board: &Board) -> Result<MoveScore, SearchError> {
        if !board.has_legal_moves() {
            return Err(SearchError::NoLegalMove);
        }

        self.prepare(board);
        let n_empties = self.empties.count;
        let (score, best_move) =
            self.mover_with_sorting(board, SCORE_MIN, SCORE_MAX, n_empties, Bitboard::ALL);
        debug_assert!(board.is_legal_move(best_move));
        debug!(n_empties, %best_move, score, n_nodes = self.n_nodes, "endgame solve finished");
        Ok(MoveScore::new(best_move, score, vec![best_move]))
    }

    /// Drops everything the table has learned.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Nodes visited by the last call.
    pub fn n_nodes(&self) -> u64 {
        self.n_nodes
    }

    /// Solves a nearly finished position with the fixed-order search only.
    ///
    /// Used by the midgame searcher for its last few plies, where sorting and
    /// hashing cost more than they save.
    pub(crate) fn solve_shallow(&mut self, board: &Board, alpha: Score, beta: Score) -> Score {
        self.prepare(board);
        let n_empties = self.empties.count;
        self.solve_no_parity(board, alpha, beta, n_empties)
    }

    fn prepare(&mut self, board: &Board) {
        self.empties = EmptyList::new(board);
        self.n_nodes = 0;
    }

    fn solve_node(&mut self, board: &Board, alpha: Score, beta: Score, n_empties: Depth) -> Score {
        if n_empties < self.options.min_parity_depth || n_empties <= 3 {
            return self.solve_no_parity(board, alpha, beta, n_empties);
        }
        self.solve_deep(board, alpha, beta, n_empties, Bitboard::ALL)
    }

    /// Searches with parity ordering and, deep enough, sorting and hashing.
    ///
    /// `moves_to_check` restricts the squares tried for the side to move; it is
    /// the exact legal move set when the parent already computed it.
    fn solve_deep(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        n_empties: Depth,
        moves_to_check: Bitboard,
    ) -> Score {
        if n_empties < self.options.min_parity_depth || n_empties <= 3 {
            return self.solve_no_parity(board, alpha, beta, n_empties);
        }
        self.n_nodes += 1;

        let score = self.mover_deep(board, alpha, beta, n_empties, moves_to_check);
        if score != NO_MOVE {
            return score;
        }
        let passed = board.switch_players();
        let score = self.mover_deep(&passed, -beta, -alpha, n_empties, Bitboard::ALL);
        if score == NO_MOVE {
            board.terminal_score()
        } else {
            -score
        }
    }

    fn mover_deep(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        n_empties: Depth,
        moves_to_check: Bitboard,
    ) -> Score {
        if n_empties < self.options.min_sort_depth {
            self.mover_no_sort(board, alpha, beta, n_empties, moves_to_check)
        } else {
            self.mover_with_hash(board, alpha, beta, n_empties, moves_to_check)
        }
    }

    /// Tries moves into odd regions first, then the rest, each in list order.
    fn mover_no_sort(
        &mut self,
        board: &Board,
        mut alpha: Score,
        beta: Score,
        n_empties: Depth,
        moves_to_check: Bitboard,
    ) -> Score {
        let mut best_score = NO_MOVE;
        for odd in [true, false] {
            let mut sq = self.empties.first();
            while sq != Square::None {
                if moves_to_check.contains(sq) && self.empties.is_odd_region(sq) == odd {
                    let flipped = flip::flip(sq, board.player, board.opponent);
                    if !flipped.is_empty() {
                        let next = board.make_move_with_flipped(flipped, sq);
                        self.empties.remove(sq);
                        let score = -self.solve_deep(&next, -beta, -alpha, n_empties - 1, Bitboard::ALL);
                        self.empties.restore(sq);

                        if score > best_score {
                            best_score = score;
                            if score > alpha {
                                if score >= beta {
                                    return best_score;
                                }
                                alpha = score;
                            }
                        }
                    }
                }
                sq = self.empties.next(sq);
            }
        }
        best_score
    }

    /// Probes the table, searches the sorted moves and records the result.
    fn mover_with_hash(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        n_empties: Depth,
        moves_to_check: Bitboard,
    ) -> Score {
        let use_table = n_empties >= self.options.min_hash_depth;
        let mut search_alpha = alpha;
        let mut search_beta = beta;
        if use_table && let Some(entry) = self.table.find(board) {
            if let Some(score) = entry.cutoff(alpha, beta) {
                return score;
            }
            search_alpha = search_alpha.max(entry.min);
            search_beta = search_beta.min(entry.max);
        }

        let (score, best_move) =
            self.mover_with_sorting(board, search_alpha, search_beta, n_empties, moves_to_check);

        // The bounds are stored against the caller's window, not the narrowed one.
        if use_table && score != NO_MOVE {
            self.table.store(board, alpha, beta, n_empties, best_move, score);
        }
        score
    }

    /// Searches the moves of `board` best first.
    ///
    /// # Returns
    ///
    /// The fail-soft score and the move that achieved it, or `(NO_MOVE,
    /// Square::None)` if the side to move has no legal move.
    fn mover_with_sorting(
        &mut self,
        board: &Board,
        mut alpha: Score,
        beta: Score,
        n_empties: Depth,
        moves_to_check: Bitboard,
    ) -> (Score, Square) {
        let idx = n_empties as usize;
        if n_empties >= self.options.min_etc_depth {
            let cutoff = self.sorters[idx].create_with_etc(
                &self.empties,
                board,
                moves_to_check,
                &self.table,
                alpha,
                beta,
            );
            if let Some(cut) = cutoff {
                return (cut.score, cut.sq);
            }
        } else {
            self.sorters[idx].create_without_etc(&self.empties, board, moves_to_check);
        }

        let mut best_score = NO_MOVE;
        let mut best_move = Square::None;
        for i in 0..self.sorters[idx].len() {
            let mv = self.sorters[idx].get(i);
            let next = board.make_move_with_flipped(mv.flips, mv.sq);
            self.empties.remove(mv.sq);
            let score = if i > 0 && n_empties >= self.options.min_negascout_depth {
                let probe = -self.solve_deep(&next, -alpha - 1, -alpha, n_empties - 1, mv.enemy_moves);
                if probe > alpha && probe < beta {
                    -self.solve_deep(&next, -beta, -probe, n_empties - 1, mv.enemy_moves)
                } else {
                    probe
                }
            } else {
                -self.solve_deep(&next, -beta, -alpha, n_empties - 1, mv.enemy_moves)
            };
            self.empties.restore(mv.sq);

            if score > best_score {
                best_score = score;
                best_move = mv.sq;
                if score > alpha {
                    if score >= beta {
                        break;
                    }
                    alpha = score;
                }
            }
        }
        (best_score, best_move)
    }

    /// Searches in static list order with no parity, sorting or hashing.
    fn solve_no_parity(&mut self, board: &Board, alpha: Score, beta: Score, n_empties: Depth) -> Score {
        match n_empties {
            0 => {
                self.n_nodes += 1;
                board.terminal_score()
            }
            1 => self.solve1(board, self.empties.first()),
            2 => {
                let sq1 = self.empties.first();
                let sq2 = self.empties.next(sq1);
                self.solve2(board, alpha, beta, sq1, sq2)
            }
            3 => self.solve3(board, alpha, beta),
            _ => {
                self.n_nodes += 1;
                let score = self.mover_no_parity(board, alpha, beta, n_empties);
                if score != NO_MOVE {
                    return score;
                }
                let score = self.mover_no_parity(&board.switch_players(), -beta, -alpha, n_empties);
                if score == NO_MOVE {
                    board.terminal_score()
                } else {
                    -score
                }
            }
        }
    }

    fn mover_no_parity(&mut self, board: &Board, mut alpha: Score, beta: Score, n_empties: Depth) -> Score {
        let mut best_score = NO_MOVE;
        let mut sq = self.empties.first();
        while sq != Square::None {
            let flipped = flip::flip(sq, board.player, board.opponent);
            if !flipped.is_empty() {
                let next = board.make_move_with_flipped(flipped, sq);
                self.empties.remove(sq);
                let score = -self.solve_no_parity(&next, -beta, -alpha, n_empties - 1);
                self.empties.restore(sq);

                if score > best_score {
                    best_score = score;
                    if score > alpha {
                        if score >= beta {
                            return best_score;
                        }
                        alpha = score;
                    }
                }
            }
            sq = self.empties.next(sq);
        }
        best_score
    }

    fn solve3(&mut self, board: &Board, alpha: Score, beta: Score) -> Score {
        self.n_nodes += 1;
        let score = self.mover_result3(board, alpha, beta);
        if score != NO_MOVE {
            return score;
        }
        let score = self.mover_result3(&board.switch_players(), -beta, -alpha);
        if score == NO_MOVE {
            board.terminal_score()
        } else {
            -score
        }
    }

    fn mover_result3(&mut self, board: &Board, mut alpha: Score, beta: Score) -> Score {
        let mut best_score = NO_MOVE;
        let mut sq = self.empties.first();
        while sq != Square::None {
            let flipped = flip::flip(sq, board.player, board.opponent);
            if !flipped.is_empty() {
                let next = board.make_move_with_flipped(flipped, sq);
                self.empties.remove(sq);
                let sq1 = self.empties.first();
                let sq2 = self.empties.next(sq1);
                let score = -self.solve2(&next, -beta, -alpha, sq1, sq2);
                self.empties.restore(sq);

                if score > best_score {
                    best_score = score;
                    if score > alpha {
                        if score >= beta {
                            return best_score;
                        }
                        alpha = score;
                    }
                }
            }
            sq = self.empties.next(sq);
        }
        best_score
    }

    fn solve2(&mut self, board: &Board, alpha: Score, beta: Score, sq1: Square, sq2: Square) -> Score {
        self.n_nodes += 1;
        let score = self.mover_result2(board, beta, sq1, sq2);
        if score != NO_MOVE {
            return score;
        }
        let score = self.mover_result2(&board.switch_players(), -alpha, sq1, sq2);
        if score == NO_MOVE {
            board.terminal_score()
        } else {
            -score
        }
    }

    /// Tries both orders of the last two empties, stopping after the first if it
    /// already reaches `beta`.
    fn mover_result2(&mut self, board: &Board, beta: Score, sq1: Square, sq2: Square) -> Score {
        let mut best_score = NO_MOVE;

        let flipped = flip::flip(sq1, board.player, board.opponent);
        if !flipped.is_empty() {
            let score = -self.solve1(&board.make_move_with_flipped(flipped, sq1), sq2);
            if score >= beta {
                return score;
            }
            best_score = score;
        }

        let flipped = flip::flip(sq2, board.player, board.opponent);
        if !flipped.is_empty() {
            let score = -self.solve1(&board.make_move_with_flipped(flipped, sq2), sq1);
            best_score = best_score.max(score);
        }
        best_score
    }

    /// Exact score with one empty square left.
    ///
    /// The placed disc is never added to a bitboard, so the counts below are
    /// offset by one: after the mover plays, the board holds
    /// `popcount(player | flipped) + 1` mover discs out of 64.
    fn solve1(&mut self, board: &Board, sq: Square) -> Score {
        self.n_nodes += 1;

        let flipped = flip::flip(sq, board.player, board.opponent);
        if !flipped.is_empty() {
            return 2 * (board.player | flipped).count() as Score - 62;
        }
        let flipped = flip::flip(sq, board.opponent, board.player);
        if !flipped.is_empty() {
            return 62 - 2 * (board.opponent | flipped).count() as Score;
        }
        2 * board.player.count() as Score - 63
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_board_is_terminal() {
        let board = Board::from_bitboards(0x0000_ffff_ffff_ffffu64, 0xffff_0000_0000_0000u64);
        assert_eq!(Solver::default().solve(&board), 48 - 16);
    }

    #[test]
    fn test_one_empty_closed_forms() {
        let mut solver = Solver::default();

        // Mover plays a1 and flips b1.
        let board = Board::from_bitboards(!0b11u64, 0b10u64);
        assert_eq!(solver.solve(&board), 64);

        // Mover must pass; the opponent plays a1 and flips b1.
        let board = Board::from_bitboards(0b10u64, !0b11u64);
        assert_eq!(solver.solve(&board), -64);

        // Every line through a1 belongs to the mover: nobody can play there.
        let player = 0x0000_0000_0000_00feu64 | 0x0101_0101_0101_0100 | 0x8040_2010_0804_0200;
        let board = Board::from_bitboards(player, !(player | 1));
        assert!(board.is_game_over());
        assert_eq!(solver.solve(&board), 21 - 42);
    }

    #[test]
    fn test_solve_with_move_requires_a_move() {
        let board = Board::from_bitboards(u64::MAX, 0u64);
        assert_eq!(
            Solver::default().solve_with_move(&board),
            Err(SearchError::NoLegalMove)
        );
    }

    #[test]
    fn test_window_results_are_fail_soft() {
        let mut solver = Solver::default();
        let board = Board::from_bitboards(!0b11u64, 0b10u64);
        assert!(solver.solve_window(&board, -10, 10) >= 10);
        assert_eq!(solver.solve_window(&board, 60, 64), 64);
    }
}
