//! Depth-limited midgame search.
//!
//! Fail-soft alpha-beta over an injected [`Eval`], in centi-discs. Nodes are
//! ordered by a table move or internal iterative deepening, then by a one-ply
//! search (deep nodes) or a static corner/X-square ordering (shallow nodes).
//! Multi-ProbCut skips deep searches whose result a shallow probe predicts with
//! enough confidence, and the last few plies are solved exactly.
//!
//! # References:
//!
//! - <https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/midgame.c>

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::constants::{DISK_VALUE, MID_SCORE_INF, MID_SCORE_MAX, SCORE_MAX, SCORE_MIN};
use crate::eval::Eval;
use crate::flip;
use crate::move_sorter::MAX_MOVES;
use crate::search::endgame::Solver;
use crate::search::options::{MidgameOptions, SolverOptions};
use crate::search::search_result::MoveScore;
use crate::search::{AbortCheck, Aborted, Book, NeverAbort, SearchError};
use crate::square::Square;
use crate::transposition_table::{MidgameTable, TableOptions};
use crate::types::{Depth, Score, ScoredMove};

/// Score of a node before any move has been searched.
const NO_SCORE: Score = -MID_SCORE_INF;

/// Reusable midgame searcher.
///
/// Owns its table and a small exact solver for the last plies. One instance
/// searches one position at a time.
pub struct MidgameSearcher<E: Eval> {
    eval: E,
    options: MidgameOptions,
    table: MidgameTable,
    solver: Solver,
    book: Option<Box<dyn Book>>,
    n_nodes: u64,
    root_depth: Depth,
    min_book_check_empties: u32,
}

impl<E: Eval> MidgameSearcher<E> {
    pub fn new(eval: E, options: MidgameOptions) -> Self {
        // The exact solves here never reach the hashing threshold.
        let solver_options = SolverOptions::default().with_table(TableOptions::default().with_bits(0));
        MidgameSearcher {
            eval,
            table: MidgameTable::new(options.table),
            options,
            solver: Solver::new(solver_options),
            book: None,
            n_nodes: 0,
            root_depth: 0,
            min_book_check_empties: 0,
        }
    }

    /// Attaches an opening book, consulted near the root of every search.
    pub fn with_book(mut self, book: impl Book + 'static) -> Self {
        self.book = Some(Box::new(book));
        self
    }

    pub fn options(&self) -> &MidgameOptions {
        &self.options
    }

    /// Selects a move with a full-window search.
    ///
    /// # Arguments
    ///
    /// * `board` - The position to search.
    /// * `moves` - Legal moves to consider. A subset of the legal moves restricts
    ///   the choice to that subset.
    /// * `depth` - Search depth in plies.
    ///
    /// # Returns
    ///
    /// The best move, its score in centi-discs and the expected line, or
    /// [`SearchError::NoLegalMove`] if `moves` is empty.
    pub fn get_move_score(&mut self, board: &Board, moves: Bitboard, depth: Depth) -> Result<MoveScore, SearchError> {
        self.get_move_score_with_abort(board, moves, depth, &NeverAbort)
    }

    /// Like [`get_move_score`](Self::get_move_score), polling `abort` as it goes.
    ///
    /// # Returns
    ///
    /// [`SearchError::Aborted`] if `abort` fired. Nothing from the unfinished
    /// nodes is written to the table.
    ///
    /// `abort` is only polled at nodes with at least
    /// [`abort_check_depth`](MidgameOptions::abort_check_depth) plies left, the
    /// root included, so a search shallower than that runs to completion.
    pub fn get_move_score_with_abort(
        &mut self,
        board: &Board,
        moves: Bitboard,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<MoveScore, SearchError> {
        if moves.is_empty() {
            return Err(SearchError::NoLegalMove);
        }
        debug_assert!((moves & !board.get_moves()).is_empty());

        let depth = depth.max(1);
        self.begin(board, depth);
        let result = self
            .check_abort(depth, abort)
            .and_then(|_| self.root_move(board, moves, depth, abort))
            .inspect_err(|_| debug!(depth, n_nodes = self.n_nodes, "midgame search aborted"))?;

        let best_move = match result.sq {
            Square::None => moves.lsb_square().unwrap_or(Square::None),
            sq => sq,
        };
        let mut pv = vec![best_move];
        pv.extend(self.table.extract_pv(&board.make_move(best_move), depth as usize - 1));

        debug!(depth, %best_move, score = result.score, n_nodes = self.n_nodes, "midgame search finished");
        Ok(MoveScore::new(best_move, result.score, pv))
    }

    /// Scores a position with a full-width search that never aborts.
    ///
    /// The side to move may have to pass; finished games score their final disc
    /// differential. Depth 0 returns the evaluation.
    pub fn calc_score(&mut self, board: &Board, depth: Depth) -> Score {
        match self.calc_score_with_window(board, -MID_SCORE_INF, MID_SCORE_INF, depth, &NeverAbort) {
            Ok(score) => score,
            Err(Aborted) => unreachable!("NeverAbort does not abort"),
        }
    }

    /// Scores a position with a fail-soft window, polling `abort` as it goes.
    pub fn calc_score_with_window(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<Score, Aborted> {
        debug_assert!(alpha < beta);
        self.begin(board, depth);
        let score = self
            .search_score(board, alpha, beta, depth, abort)
            .inspect_err(|_| debug!(depth, n_nodes = self.n_nodes, "midgame search aborted"))?;
        debug!(depth, alpha, beta, score, n_nodes = self.n_nodes, "midgame search finished");
        Ok(score)
    }

    /// Scores one move given the position it leads to.
    ///
    /// # Arguments
    ///
    /// * `sq` - The move that was played.
    /// * `sub_board` - The position after `sq`.
    /// * `alpha`, `beta` - Window from `sub_board`'s point of view.
    /// * `sub_depth` - Depth left below `sub_board`.
    ///
    /// # Returns
    ///
    /// The score from the point of view of the player who played `sq`, with the
    /// line starting at `sq`.
    pub fn calc_sub_move_score(
        &mut self,
        sq: Square,
        sub_board: &Board,
        alpha: Score,
        beta: Score,
        sub_depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<MoveScore, Aborted> {
        let score = -self.calc_score_with_window(sub_board, alpha, beta, sub_depth, abort)?;
        let mut pv = vec![sq];
        pv.extend(self.table.extract_pv(sub_board, sub_depth as usize));
        Ok(MoveScore::new(sq, score, pv))
    }

    /// Drops everything the table has learned.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Nodes visited by the last call.
    pub fn n_nodes(&self) -> u64 {
        self.n_nodes
    }

    /// Number of positions currently stored in the table.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    fn begin(&mut self, board: &Board, depth: Depth) {
        self.root_depth = depth;
        self.n_nodes = 0;
        self.min_book_check_empties = board.get_empty_count().saturating_sub(self.options.book_margin);
        self.table.new_search();
    }

    #[inline]
    fn check_abort(&self, depth: Depth, abort: &dyn AbortCheck) -> Result<(), Aborted> {
        if depth >= self.options.abort_check_depth && abort.should_abort() {
            return Err(Aborted);
        }
        Ok(())
    }

    /// Searches the root over `moves`.
    ///
    /// Only a search over every legal move may read or write the root's table
    /// entry. A restricted search scores the subset alone.
    fn root_move(
        &mut self,
        board: &Board,
        moves: Bitboard,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<ScoredMove, Aborted> {
        if moves == board.get_moves() {
            return self.hash_move(board, moves, -MID_SCORE_INF, MID_SCORE_INF, depth, abort);
        }
        let suggested = self
            .table
            .suggested_move(board)
            .filter(|&sq| moves.contains(sq))
            .unwrap_or(Square::None);
        self.tree_move(board, moves, -MID_SCORE_INF, MID_SCORE_INF, depth, suggested, abort)
    }

    /// Scores a position whose side to move may have to pass.
    fn search_score(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<Score, Aborted> {
        self.n_nodes += 1;
        self.check_abort(depth, abort)?;

        if let Some(book) = &self.book
            && board.get_empty_count() >= self.min_book_check_empties
            && let Some(score) = book.get_score(board)
        {
            return Ok(score * DISK_VALUE);
        }

        let moves = board.get_moves();
        if !moves.is_empty() {
            return self.tree_score(board, moves, alpha, beta, depth, abort);
        }

        let passed = board.switch_players();
        let moves = passed.get_moves();
        if !moves.is_empty() {
            return Ok(-self.tree_score(&passed, moves, -beta, -alpha, depth, abort)?);
        }
        Ok(board.terminal_score() * DISK_VALUE)
    }

    /// Scores a position whose side to move has `moves`.
    fn tree_score(
        &mut self,
        board: &Board,
        moves: Bitboard,
        alpha: Score,
        beta: Score,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<Score, Aborted> {
        if depth == 0 {
            return Ok(self.eval.evaluate(board));
        }

        let n_empties = board.get_empty_count();
        if self.options.variable_endgame && n_empties <= self.options.solver_start_depth {
            let (solver_alpha, solver_beta) = solver_window(alpha, beta);
            let score = self.solver.solve_shallow(board, solver_alpha, solver_beta);
            self.n_nodes += self.solver.n_nodes();
            return Ok(score * DISK_VALUE);
        }

        let result = if self.options.uses_mpc() && depth >= 2 {
            self.mpc_move(board, moves, alpha, beta, depth, abort)?
        } else {
            self.hash_move(board, moves, alpha, beta, depth, abort)?
        };
        Ok(result.score)
    }

    /// Searches a node whose side to move has `moves`, using and updating the table.
    ///
    /// # Returns
    ///
    /// The fail-soft score with the move that raised alpha, or `Square::None`
    /// if no move did.
    fn hash_move(
        &mut self,
        board: &Board,
        moves: Bitboard,
        alpha: Score,
        beta: Score,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<ScoredMove, Aborted> {
        debug_assert!(alpha < beta);
        debug_assert!(depth > 0);

        let selectivity = self.options.selectivity;
        if let Some(hit) = self.table.check_cutoff(board, depth, alpha, beta, selectivity) {
            return Ok(hit);
        }

        let suggested = self.suggested_move(board, moves, alpha, beta, depth, abort)?;
        let result = self.tree_move(board, moves, alpha, beta, depth, suggested, abort)?;
        self.table
            .store(board, alpha, beta, depth, selectivity, result.sq, result.score);
        Ok(result)
    }

    /// Multi-ProbCut: tries to settle the node with shallow probes before
    /// searching it like [`hash_move`](Self::hash_move).
    ///
    /// A successful probe returns `beta` or `alpha` and stores nothing.
    fn mpc_move(
        &mut self,
        board: &Board,
        moves: Bitboard,
        alpha: Score,
        beta: Score,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<ScoredMove, Aborted> {
        let selectivity = self.options.selectivity;
        if let Some(hit) = self.table.check_cutoff(board, depth, alpha, beta, selectivity) {
            return Ok(hit);
        }

        let t = self.options.mpc.t_value(selectivity);
        let mut hint = Square::None;
        for cutter in self.options.mpc.cutters(board.get_empty_count(), depth) {
            let shallow_alpha = cutter.shallow_alpha(alpha, t);
            let shallow_beta = cutter.shallow_beta(beta, t);
            if cutter.shallow_depth == 0 {
                let score = self.eval.evaluate(board);
                if score >= shallow_beta {
                    return Ok(ScoredMove::new(Square::None, beta));
                }
                if score <= shallow_alpha {
                    return Ok(ScoredMove::new(Square::None, alpha));
                }
            } else {
                let probe = self.mpc_move(board, moves, shallow_alpha, shallow_beta, cutter.shallow_depth, abort)?;
                if probe.score >= shallow_beta {
                    return Ok(ScoredMove::new(probe.sq, beta));
                }
                if probe.score <= shallow_alpha {
                    return Ok(ScoredMove::new(Square::None, alpha));
                }
                hint = probe.sq;
            }
        }

        let suggested = if hint != Square::None && moves.contains(hint) {
            hint
        } else {
            self.suggested_move(board, moves, alpha, beta, depth, abort)?
        };
        let result = self.tree_move(board, moves, alpha, beta, depth, suggested, abort)?;
        self.table
            .store(board, alpha, beta, depth, selectivity, result.sq, result.score);
        Ok(result)
    }

    /// Returns the move to search first: the table move, or the result of a
    /// shallower search (internal iterative deepening).
    fn suggested_move(
        &mut self,
        board: &Board,
        moves: Bitboard,
        alpha: Score,
        beta: Score,
        depth: Depth,
        abort: &dyn AbortCheck,
    ) -> Result<Square, Aborted> {
        if let Some(sq) = self.table.suggested_move(board)
            && moves.contains(sq)
        {
            return Ok(sq);
        }
        if depth > 2 {
            let iid_depth = if depth > 3 { 2 } else { 1 };
            return Ok(self.hash_move(board, moves, alpha, beta, iid_depth, abort)?.sq);
        }
        Ok(Square::None)
    }

    /// Searches `suggested` first, then the remaining moves.
    ///
    /// From depth 5 the remaining moves are ordered by a one-ply search;
    /// shallower nodes try corners, then ordinary squares, then X-squares.
    #[allow(clippy::too_many_arguments)]
    fn tree_move(
        &mut self,
        board: &Board,
        mut moves: Bitboard,
        mut alpha: Score,
        beta: Score,
        depth: Depth,
        suggested: Square,
        abort: &dyn AbortCheck,
    ) -> Result<ScoredMove, Aborted> {
        let mut best = ScoredMove::new(Square::None, NO_SCORE);

        if suggested != Square::None {
            let score = self.move_score(board, alpha, beta, depth, suggested, abort)?;
            if update_best(&mut best, &mut alpha, beta, suggested, score) {
                return Ok(best);
            }
            moves = moves.remove(suggested);
        }

        if depth >= 5 {
            let mut ordered: ArrayVec<(Score, Square), MAX_MOVES> = ArrayVec::new();
            for sq in moves.iter() {
                let value = self.move_score(board, -MID_SCORE_MAX, MID_SCORE_MAX, 1, sq, abort)?;
                ordered.push((value, sq));
            }
            ordered.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            for (_, sq) in ordered {
                let score = self.move_score(board, alpha, beta, depth, sq, abort)?;
                if update_best(&mut best, &mut alpha, beta, sq, score) {
                    return Ok(best);
                }
            }
        } else {
            for class in [moves.corners(), moves.ordinary_squares(), moves.x_squares()] {
                for sq in class.iter() {
                    let score = self.move_score(board, alpha, beta, depth, sq, abort)?;
                    if update_best(&mut best, &mut alpha, beta, sq, score) {
                        return Ok(best);
                    }
                }
            }
        }
        Ok(best)
    }

    /// Plays `sq` and returns the child's score from the mover's point of view.
    fn move_score(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        depth: Depth,
        sq: Square,
        abort: &dyn AbortCheck,
    ) -> Result<Score, Aborted> {
        let flipped = flip::flip(sq, board.player, board.opponent);
        let next = board.make_move_with_flipped(flipped, sq);

        if self.options.trace_search {
            trace!("{}[{}] ({:+5},{:+5}) scoring({})", self.indent(depth), depth, alpha, beta, sq);
        }
        let score = -self.search_score(&next, -beta, -alpha, depth - 1, abort)?;
        if self.options.trace_search {
            trace!("{}[{}] ({:+5},{:+5}) score({})={:+5}", self.indent(depth), depth, alpha, beta, sq, score);
        }
        Ok(score)
    }

    fn indent(&self, depth: Depth) -> String {
        "  ".repeat(self.root_depth.saturating_sub(depth) as usize)
    }
}

/// Records `score` for `sq`. Returns `true` on a beta cutoff.
#[inline]
fn update_best(best: &mut ScoredMove, alpha: &mut Score, beta: Score, sq: Square, score: Score) -> bool {
    if score > best.score {
        best.score = score;
        if score > *alpha {
            best.sq = sq;
            *alpha = score;
            if score >= beta {
                return true;
            }
        }
    }
    false
}

/// Converts a centi-disc window to the narrowest disc window that decides it.
///
/// `alpha` rounds down and `beta` rounds up. Both are clamped to the disc range
/// with `alpha < beta` kept.
fn solver_window(alpha: Score, beta: Score) -> (Score, Score) {
    let solver_alpha = if alpha < -MID_SCORE_MAX {
        SCORE_MIN
    } else {
        (MID_SCORE_INF + alpha) / DISK_VALUE - 65
    };
    let solver_beta = if beta > MID_SCORE_MAX {
        SCORE_MAX
    } else {
        (MID_SCORE_INF + beta - 1) / DISK_VALUE - 64
    };
    let solver_alpha = solver_alpha.clamp(SCORE_MIN, SCORE_MAX - 1);
    let solver_beta = solver_beta.clamp(solver_alpha + 1, SCORE_MAX);
    (solver_alpha, solver_beta)
}
