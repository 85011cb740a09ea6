//! Static evaluation.
//!
//! The midgame searcher scores its leaves through the [`Eval`] trait, so any
//! evaluator (a learned pattern model, a network, a closure in a test) can be
//! plugged in. [`SimpleEval`] is a small hand-written heuristic used by the
//! tests and benches; it is not tuned.

use crate::board::Board;
use crate::constants::MID_SCORE_MAX;
use crate::types::Score;

/// Scores a position in centi-discs from the side to move's point of view.
pub trait Eval {
    fn evaluate(&self, board: &Board) -> Score;
}

impl<F> Eval for F
where
    F: Fn(&Board) -> Score,
{
    #[inline]
    fn evaluate(&self, board: &Board) -> Score {
        self(board)
    }
}

const MOBILITY_WEIGHT: Score = 40;
const POTENTIAL_MOBILITY_WEIGHT: Score = 15;
const CORNER_WEIGHT: Score = 250;
const CORNER_STABILITY_WEIGHT: Score = 60;

/// Heuristic evaluator built from mobility, frontier and corner terms.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleEval;

impl Eval for SimpleEval {
    fn evaluate(&self, board: &Board) -> Score {
        let opponent_view = board.switch_players();

        let mobility = board.get_moves().corner_weighted_count() as Score
            - opponent_view.get_moves().corner_weighted_count() as Score;
        let potential_mobility = board.get_potential_moves().count() as Score
            - opponent_view.get_potential_moves().count() as Score;
        let corners = board.player.corners().count() as Score - board.opponent.corners().count() as Score;
        let corner_stability =
            board.player.corner_stability() as Score - board.opponent.corner_stability() as Score;

        let score = mobility * MOBILITY_WEIGHT
            + potential_mobility * POTENTIAL_MOBILITY_WEIGHT
            + corners * CORNER_WEIGHT
            + corner_stability * CORNER_STABILITY_WEIGHT;
        score.clamp(-MID_SCORE_MAX + 1, MID_SCORE_MAX - 1)
    }
}
