//! Common type aliases used throughout the engine.

/// Search depth in plies (midgame) or empties (endgame).
pub type Depth = u32;

/// Score from the side to move's point of view.
///
/// The endgame solver works in discs (-64 to +64). The midgame searcher works in
/// centi-discs, see [`DISK_VALUE`](crate::constants::DISK_VALUE).
pub type Score = i32;

/// Floating-point score, used for probe-cut statistics.
pub type Scoref = f64;

/// A move paired with its score.
///
/// `sq` is `Square::None` when no move is known, for example after a cutoff
/// taken from a table bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredMove {
    pub sq: crate::square::Square,
    pub score: Score,
}

impl ScoredMove {
    #[inline(always)]
    pub fn new(sq: crate::square::Square, score: Score) -> Self {
        ScoredMove { sq, score }
    }
}
