//! Game tree search.
//!
//! [`endgame::Solver`] computes exact final disc differentials; [`midgame::MidgameSearcher`]
//! estimates scores with a depth-limited search over an injected evaluator. Each
//! instance owns its tables and scratch space and runs on one thread; parallel
//! callers create one instance per worker.

pub mod endgame;
pub mod midgame;
pub mod options;
pub mod search_result;

use std::collections::HashMap;

use crate::board::Board;
use crate::types::Score;

/// Errors returned by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The side to move has no legal move to choose from.
    #[error("the side to move has no legal move")]
    NoLegalMove,
    /// The abort check asked the search to stop.
    #[error("search aborted")]
    Aborted,
}

/// Marker returned through every frame of a cancelled search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("search aborted")]
pub struct Aborted;

impl From<Aborted> for SearchError {
    fn from(_: Aborted) -> Self {
        SearchError::Aborted
    }
}

/// Cooperative cancellation, polled by the midgame searcher.
pub trait AbortCheck {
    fn should_abort(&self) -> bool;
}

impl<F> AbortCheck for F
where
    F: Fn() -> bool,
{
    #[inline]
    fn should_abort(&self) -> bool {
        self()
    }
}

/// An [`AbortCheck`] that never fires.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverAbort;

impl AbortCheck for NeverAbort {
    #[inline(always)]
    fn should_abort(&self) -> bool {
        false
    }
}

/// Opening book lookup.
pub trait Book {
    /// Returns the known score of `board` in discs, from the side to move's
    /// point of view.
    fn get_score(&self, board: &Board) -> Option<Score>;
}

impl Book for HashMap<Board, Score> {
    fn get_score(&self, board: &Board) -> Option<Score> {
        self.get(board).copied()
    }
}
