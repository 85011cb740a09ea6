//! Transposition tables.
//!
//! Both searchers cache score bounds per position in a fixed-size table of
//! 4-entry clusters. [`EndgameTable`] holds exact-solver bounds in discs;
//! [`MidgameTable`] holds depth-limited bounds in centi-discs, tagged with the
//! probe-cut width they were established under.
//!
//! An entry keeps the whole position as its key, so a hit is never a hash
//! collision. Positions can optionally be keyed by their canonical symmetric
//! image, letting reflections of a position share one entry.

use crate::board::Board;
use crate::constants::{MID_SCORE_INF, SCORE_INF};
use crate::probcut::Selectivity;
use crate::square::Square;
use crate::symmetry::Symmetry;
use crate::types::{Depth, Score, ScoredMove};

/// Size of each cluster in the transposition table.
const CLUSTER_SIZE: usize = 4;

/// Bound type implied by a search result and its window.
///
/// - `Lower`: the search failed high, the true score is at least the result.
/// - `Upper`: the search failed low, the true score is at most the result.
/// - `Exact`: the result lies strictly inside the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
    Exact,
}

impl Bound {
    /// Classifies a fail-soft search result.
    ///
    /// # Arguments
    ///
    /// * `score` - The value returned by the search.
    /// * `alpha` - The lower bound of the window the search ran with.
    /// * `beta` - The upper bound of the window the search ran with.
    #[inline]
    pub fn classify(score: Score, alpha: Score, beta: Score) -> Bound {
        if score >= beta {
            Bound::Lower
        } else if score <= alpha {
            Bound::Upper
        } else {
            Bound::Exact
        }
    }
}

/// Sizing and keying options shared by both table flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOptions {
    /// The table holds `1 << bits` clusters of 4 entries.
    pub bits: u32,
    /// Key positions by their canonical symmetric image.
    pub canonical: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            bits: 16,
            canonical: false,
        }
    }
}

impl TableOptions {
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }
}

/// Bounds stored for a position, as seen from the probing position's orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashEntry {
    /// Lower bound on the score.
    pub min: Score,
    /// Upper bound on the score.
    pub max: Score,
    /// Best or refuting move found, `Square::None` if the search failed low.
    pub best_move: Square,
    /// Depth (midgame) or empty count (endgame) the bounds were searched to.
    pub depth: Depth,
    /// Probe-cut width the bounds were searched with.
    pub selectivity: Selectivity,
}

impl HashEntry {
    /// Returns a score that settles a search with window `(alpha, beta)`, if any.
    ///
    /// # Returns
    ///
    /// `Some(min)` if `min >= beta`, `Some(max)` if `max <= alpha`, `Some(min)` if the
    /// entry is exact, and `None` otherwise.
    #[inline]
    pub fn cutoff(&self, alpha: Score, beta: Score) -> Option<Score> {
        if self.min >= beta {
            Some(self.min)
        } else if self.max <= alpha {
            Some(self.max)
        } else if self.min == self.max {
            Some(self.min)
        } else {
            None
        }
    }
}

/// One table slot. A vacant slot holds the empty board, which no search visits.
#[derive(Clone, Copy)]
struct TTEntry {
    key: Board,
    min: i16,
    max: i16,
    best_move: Square,
    depth: u8,
    selectivity: Selectivity,
    generation: u8,
}

impl TTEntry {
    const VACANT: TTEntry = TTEntry {
        key: Board {
            player: crate::bitboard::Bitboard::EMPTY,
            opponent: crate::bitboard::Bitboard::EMPTY,
        },
        min: 0,
        max: 0,
        best_move: Square::None,
        depth: 0,
        selectivity: Selectivity::None,
        generation: 0,
    };

    #[inline(always)]
    fn is_vacant(&self) -> bool {
        self.key.player.is_empty() && self.key.opponent.is_empty()
    }

    /// Replacement priority: depth minus 8 per generation of age. Lowest goes first.
    #[inline(always)]
    fn replacement_score(&self, generation: u8) -> i32 {
        if self.is_vacant() {
            return i32::MIN;
        }
        let age = generation.wrapping_sub(self.generation) as i32;
        self.depth as i32 - age * 8
    }

    /// Folds a new result for the same position into this entry.
    fn merge(&mut self, new: TTEntry) {
        if new.selectivity != self.selectivity || new.depth > self.depth {
            *self = new;
            return;
        }

        if new.depth < self.depth {
            // A deeper result from the current search is worth more than a shallow one.
            if self.generation != new.generation {
                *self = new;
            } else if self.best_move == Square::None {
                self.best_move = new.best_move;
            }
            return;
        }

        let min = self.min.max(new.min);
        let max = self.max.min(new.max);
        if min > max {
            *self = new;
            return;
        }
        self.min = min;
        self.max = max;
        self.generation = new.generation;
        if new.best_move != Square::None {
            self.best_move = new.best_move;
        }
    }
}

/// Clustered position cache shared by [`EndgameTable`] and [`MidgameTable`].
pub struct TranspositionTable {
    entries: Box<[TTEntry]>,
    cluster_count: u64,
    canonical: bool,
    inf: Score,
    generation: u8,
}

impl TranspositionTable {
    /// Creates a table.
    ///
    /// # Arguments
    ///
    /// * `options` - Size and keying options.
    /// * `inf` - The score used for a missing bound.
    pub fn new(options: TableOptions, inf: Score) -> Self {
        let cluster_count = 1u64 << options.bits.min(30);
        let entries = vec![TTEntry::VACANT; cluster_count as usize * CLUSTER_SIZE];
        TranspositionTable {
            entries: entries.into_boxed_slice(),
            cluster_count,
            canonical: options.canonical,
            inf,
            generation: 0,
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::VACANT);
        self.generation = 0;
    }

    /// Starts a new generation. Entries from older generations are replaced first.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of occupied entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_vacant()).count()
    }

    /// Checks whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(TTEntry::is_vacant)
    }

    #[inline]
    fn key_of(&self, board: &Board) -> (Board, Symmetry) {
        if self.canonical {
            board.canonical()
        } else {
            (*board, Symmetry::Identity)
        }
    }

    #[inline(always)]
    fn cluster_index(&self, key: &Board) -> usize {
        (mul_hi64(key.hash(), self.cluster_count) as usize) * CLUSTER_SIZE
    }

    /// Looks up the bounds stored for `board`.
    ///
    /// # Returns
    ///
    /// The entry, with its best move mapped back to `board`'s orientation, or
    /// `None` if the position is not stored.
    pub fn find(&self, board: &Board) -> Option<HashEntry> {
        let (key, sym) = self.key_of(board);
        let base = self.cluster_index(&key);
        self.entries[base..base + CLUSTER_SIZE]
            .iter()
            .find(|e| e.key == key)
            .map(|e| HashEntry {
                min: e.min as Score,
                max: e.max as Score,
                best_move: sym.inverse().apply_square(e.best_move),
                depth: e.depth as Depth,
                selectivity: e.selectivity,
            })
    }

    /// Records a fail-soft search result.
    ///
    /// `score >= beta` is stored as a lower bound, `score <= alpha` as an upper
    /// bound, and anything in between as an exact score.
    ///
    /// # Arguments
    ///
    /// * `board` - The searched position.
    /// * `alpha`, `beta` - The window the search ran with.
    /// * `depth` - Depth or empty count searched.
    /// * `best_move` - Best move found, or `Square::None`.
    /// * `score` - The search result.
    /// * `selectivity` - Probe-cut width of the search.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        depth: Depth,
        best_move: Square,
        score: Score,
        selectivity: Selectivity,
    ) {
        let score = score.clamp(-self.inf, self.inf);
        let (min, max) = match Bound::classify(score, alpha, beta) {
            Bound::Lower => (score, self.inf),
            Bound::Upper => (-self.inf, score),
            Bound::Exact => (score, score),
        };

        let (key, sym) = self.key_of(board);
        let new = TTEntry {
            key,
            min: min as i16,
            max: max as i16,
            best_move: sym.apply_square(best_move),
            depth: depth.min(u8::MAX as Depth) as u8,
            selectivity,
            generation: self.generation,
        };

        let base = self.cluster_index(&key);
        let generation = self.generation;
        let cluster = &mut self.entries[base..base + CLUSTER_SIZE];

        if let Some(entry) = cluster.iter_mut().find(|e| e.key == key) {
            entry.merge(new);
            return;
        }

        if let Some(victim) = cluster
            .iter_mut()
            .min_by_key(|e| e.replacement_score(generation))
        {
            *victim = new;
        }
    }
}

/// Multiplies two 64-bit values and returns the high 64 bits of the result.
#[inline(always)]
fn mul_hi64(a: u64, b: u64) -> u64 {
    let product = (a as u128) * (b as u128);
    (product >> 64) as u64
}

/// Table of exact-solver results, in discs, keyed by position.
pub struct EndgameTable {
    table: TranspositionTable,
}

impl EndgameTable {
    pub fn new(options: TableOptions) -> Self {
        EndgameTable {
            table: TranspositionTable::new(options, SCORE_INF),
        }
    }

    /// Looks up the bounds stored for `board`. Never mutates the table.
    #[inline]
    pub fn find(&self, board: &Board) -> Option<HashEntry> {
        self.table.find(board)
    }

    /// Records a solver result searched with window `(alpha, beta)`.
    #[inline]
    pub fn store(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        n_empties: Depth,
        best_move: Square,
        score: Score,
    ) {
        self.table.store(
            board,
            alpha,
            beta,
            n_empties,
            best_move,
            score,
            Selectivity::None,
        );
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Table of midgame results, in centi-discs, keyed by position and probe-cut width.
pub struct MidgameTable {
    table: TranspositionTable,
}

impl MidgameTable {
    pub fn new(options: TableOptions) -> Self {
        MidgameTable {
            table: TranspositionTable::new(options, MID_SCORE_INF),
        }
    }

    /// Looks up the raw entry for `board`, whatever its depth or width.
    #[inline]
    pub fn find(&self, board: &Board) -> Option<HashEntry> {
        self.table.find(board)
    }

    /// Records a search result for `board` at the given width.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn store(
        &mut self,
        board: &Board,
        alpha: Score,
        beta: Score,
        depth: Depth,
        selectivity: Selectivity,
        best_move: Square,
        score: Score,
    ) {
        self.table
            .store(board, alpha, beta, depth, best_move, score, selectivity);
    }

    /// Checks whether stored bounds settle a search of `board`.
    ///
    /// Bounds are trusted only from an entry searched at least `depth` deep with
    /// exactly the same width.
    ///
    /// # Returns
    ///
    /// The settling score with the stored best move, or `None`.
    pub fn check_cutoff(
        &self,
        board: &Board,
        depth: Depth,
        alpha: Score,
        beta: Score,
        selectivity: Selectivity,
    ) -> Option<ScoredMove> {
        let entry = self.find(board)?;
        if entry.depth < depth || entry.selectivity != selectivity {
            return None;
        }
        entry
            .cutoff(alpha, beta)
            .map(|score| ScoredMove::new(entry.best_move, score))
    }

    /// Returns the stored best move for `board` at any depth or width.
    pub fn suggested_move(&self, board: &Board) -> Option<Square> {
        self.find(board)
            .map(|e| e.best_move)
            .filter(|&sq| sq != Square::None)
    }

    /// Follows stored best moves from `board` to build a principal variation.
    ///
    /// A forced pass appears as `Square::None`. The walk stops at the first
    /// position without a legal stored move, or after `max_len` entries.
    pub fn extract_pv(&self, board: &Board, max_len: usize) -> Vec<Square> {
        let mut pv = Vec::new();
        let mut board = *board;
        while pv.len() < max_len {
            if !board.has_legal_moves() {
                let passed = board.switch_players();
                if !passed.has_legal_moves() {
                    break;
                }
                pv.push(Square::None);
                board = passed;
                continue;
            }
            match self.suggested_move(&board) {
                Some(sq) if board.is_legal_move(sq) => {
                    pv.push(sq);
                    board = board.make_move(sq);
                }
                _ => break,
            }
        }
        while pv.last() == Some(&Square::None) {
            pv.pop();
        }
        pv
    }

    pub fn new_search(&mut self) {
        self.table.new_search();
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TableOptions {
        TableOptions::default().with_bits(4)
    }

    #[test]
    fn test_bound_classification() {
        assert_eq!(Bound::classify(5, 0, 5), Bound::Lower);
        assert_eq!(Bound::classify(0, 0, 5), Bound::Upper);
        assert_eq!(Bound::classify(3, 0, 5), Bound::Exact);
    }

    #[test]
    fn test_store_semantics() {
        let board = Board::new();
        let mut table = EndgameTable::new(small());
        assert!(table.find(&board).is_none());

        table.store(&board, -10, 10, 60, Square::D3, 12);
        let e = table.find(&board).unwrap();
        assert_eq!((e.min, e.max), (12, SCORE_INF));
        assert_eq!(e.best_move, Square::D3);

        table.clear();
        table.store(&board, -10, 10, 60, Square::D3, -10);
        let e = table.find(&board).unwrap();
        assert_eq!((e.min, e.max), (-SCORE_INF, -10));

        table.clear();
        table.store(&board, -10, 10, 60, Square::F5, 4);
        let e = table.find(&board).unwrap();
        assert_eq!((e.min, e.max), (4, 4));
        assert_eq!(e.cutoff(-64, 64), Some(4));
    }

    #[test]
    fn test_same_depth_bounds_intersect() {
        let board = Board::new();
        let mut table = EndgameTable::new(small());
        table.store(&board, -10, 2, 60, Square::C4, 6);
        table.store(&board, 8, 20, 60, Square::None, 8);
        let e = table.find(&board).unwrap();
        assert_eq!((e.min, e.max), (6, 8));
        assert_eq!(e.best_move, Square::C4);
        assert_eq!(e.cutoff(0, 6), Some(6));
        assert_eq!(e.cutoff(8, 12), Some(8));
        assert_eq!(e.cutoff(6, 8), None);
    }

    #[test]
    fn test_find_does_not_mutate() {
        let board = Board::new();
        let mut table = EndgameTable::new(small());
        table.store(&board, -64, 64, 60, Square::E6, 0);
        let before = table.find(&board);
        for _ in 0..3 {
            assert_eq!(table.find(&board), before);
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_widths_are_kept_apart() {
        let board = Board::new();
        let mut table = MidgameTable::new(small());
        table.store(&board, -100, 100, 6, Selectivity::Level2, Square::D3, 300);

        assert!(table.check_cutoff(&board, 6, -100, 100, Selectivity::Level2).is_some());
        assert!(table.check_cutoff(&board, 6, -100, 100, Selectivity::None).is_none());
        assert!(table.check_cutoff(&board, 7, -100, 100, Selectivity::Level2).is_none());
        assert_eq!(table.suggested_move(&board), Some(Square::D3));

        // A different width overwrites rather than merges.
        table.store(&board, -100, 100, 4, Selectivity::None, Square::F5, 50);
        let e = table.find(&board).unwrap();
        assert_eq!(e.selectivity, Selectivity::None);
        assert_eq!((e.min, e.max), (50, 50));
    }

    #[test]
    fn test_shallow_result_does_not_replace_deep() {
        let board = Board::new();
        let mut table = MidgameTable::new(small());
        table.store(&board, -100, 100, 8, Selectivity::None, Square::D3, 40);
        table.store(&board, -100, 100, 3, Selectivity::None, Square::F5, -40);
        let e = table.find(&board).unwrap();
        assert_eq!(e.depth, 8);
        assert_eq!(e.best_move, Square::D3);

        table.new_search();
        table.store(&board, -100, 100, 3, Selectivity::None, Square::F5, -40);
        let e = table.find(&board).unwrap();
        assert_eq!(e.depth, 3);
        assert_eq!(e.best_move, Square::F5);
    }

    #[test]
    fn test_replacement_prefers_shallow_and_stale() {
        // One cluster: every position competes for the same four slots.
        let mut table = MidgameTable::new(TableOptions::default().with_bits(0));
        let mut board = Board::new();
        let mut boards = Vec::new();
        for (i, depth) in [9, 2, 7, 5].into_iter().enumerate() {
            let sq = board.get_moves().lsb_square().unwrap();
            board = board.make_move(sq);
            table.store(&board, -100, 100, depth, Selectivity::None, sq, i as Score);
            boards.push((board, depth));
        }
        assert_eq!(table.len(), 4);

        let sq = board.get_moves().lsb_square().unwrap();
        let newcomer = board.make_move(sq);
        table.store(&newcomer, -100, 100, 4, Selectivity::None, sq, 0);
        assert!(table.find(&newcomer).is_some());
        // The depth-2 entry was evicted.
        assert!(table.find(&boards[1].0).is_none());
        assert!(table.find(&boards[0].0).is_some());

        // After a new search, age outweighs depth.
        table.new_search();
        table.new_search();
        let sq = newcomer.get_moves().lsb_square().unwrap();
        let fresh = newcomer.make_move(sq);
        table.store(&fresh, -100, 100, 1, Selectivity::None, sq, 0);
        assert!(table.find(&fresh).is_some());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_canonical_keys_share_entries() {
        let board = Board::new().make_move(Square::D3);
        let mut table = EndgameTable::new(small().with_canonical(true));
        // Best reply for White after d3 is c5 in this made-up entry.
        table.store(&board, -64, 64, 59, Square::C5, 0);
        for sym in Symmetry::ALL {
            let image = board.transform(sym);
            let e = table.find(&image).unwrap();
            assert_eq!(e.best_move, sym.apply_square(Square::C5), "{sym:?}");
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_extract_pv() {
        let mut table = MidgameTable::new(small());
        let root = Board::new();
        let line = [Square::F5, Square::D6, Square::C3];
        let mut board = root;
        for &sq in &line {
            table.store(&board, -100, 100, 4, Selectivity::None, sq, 0);
            board = board.make_move(sq);
        }
        assert_eq!(table.extract_pv(&root, 10), line.to_vec());
        assert_eq!(table.extract_pv(&root, 2), line[..2].to_vec());
    }

    #[test]
    fn test_clear() {
        let mut table = MidgameTable::new(small());
        table.store(&Board::new(), -1, 1, 1, Selectivity::None, Square::D3, 0);
        assert!(!table.is_empty());
        table.clear();
        assert!(table.is_empty());
        assert!(table.find(&Board::new()).is_none());
    }
}
