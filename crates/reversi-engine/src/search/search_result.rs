//! Search result types.

use std::fmt;

use crate::square::Square;
use crate::types::Score;

/// A chosen move with its score and principal variation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveScore {
    pub best_move: Square,
    /// Discs for the solver, centi-discs for the midgame searcher.
    pub score: Score,
    /// Expected line of play starting with `best_move`. A pass is `Square::None`.
    pub pv: Vec<Square>,
}

impl MoveScore {
    pub fn new(best_move: Square, score: Score, pv: Vec<Square>) -> Self {
        MoveScore {
            best_move,
            score,
            pv,
        }
    }

    /// Formats the principal variation as `d3-c5-f6`.
    pub fn pv_string(&self) -> String {
        self.pv
            .iter()
            .map(|sq| sq.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for MoveScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+} {}", self.best_move, self.score, self.pv_string())
    }
}
