//! Search configuration.

use std::str::FromStr;

use crate::probcut::{MpcConfig, Selectivity};
use crate::transposition_table::TableOptions;
use crate::types::Depth;

/// Error type for parsing search option flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("unknown search option flag '{0}'")]
    UnknownFlag(char),
}

/// Thresholds of the endgame solver, in empty squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverOptions {
    /// From this many empties, odd regions are searched before even ones.
    pub min_parity_depth: Depth,
    /// From this many empties, moves are fully sorted.
    pub min_sort_depth: Depth,
    /// From this many empties, the table is probed and updated.
    pub min_hash_depth: Depth,
    /// From this many empties, children are probed in the table while sorting.
    pub min_etc_depth: Depth,
    /// From this many empties, moves after the first get a zero-window probe.
    pub min_negascout_depth: Depth,
    pub table: TableOptions,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            min_parity_depth: 5,
            min_sort_depth: 6,
            min_hash_depth: 6,
            min_etc_depth: 7,
            min_negascout_depth: 10,
            table: TableOptions::default(),
        }
    }
}

impl SolverOptions {
    pub fn with_table(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }

    pub fn with_min_hash_depth(mut self, depth: Depth) -> Self {
        self.min_hash_depth = depth;
        self
    }

    pub fn with_min_etc_depth(mut self, depth: Depth) -> Self {
        self.min_etc_depth = depth;
        self
    }

    pub fn with_min_negascout_depth(mut self, depth: Depth) -> Self {
        self.min_negascout_depth = depth;
        self
    }
}

/// Options of the midgame searcher.
///
/// The compact flag form parsed by [`FromStr`] is a string of single-character
/// flags:
///
/// - `w`: full-width search (no Multi-ProbCut)
/// - `S`: no exact solve near the end of the game
/// - `p`: trace every scored move
#[derive(Clone, Debug, PartialEq)]
pub struct MidgameOptions {
    /// Probe-cut width. `Selectivity::None` disables Multi-ProbCut.
    pub selectivity: Selectivity,
    /// Solve exactly once few enough empties remain.
    pub variable_endgame: bool,
    /// Empty count at or below which the exact solve takes over.
    pub solver_start_depth: Depth,
    /// Remaining depth from which the abort check is polled.
    ///
    /// Nodes shallower than this, a shallow root included, never poll, so a
    /// search below this depth cannot be aborted.
    pub abort_check_depth: Depth,
    /// The book is consulted while at most this many plies below the root.
    pub book_margin: Depth,
    /// Emit a `trace` event before and after each scored move.
    pub trace_search: bool,
    pub table: TableOptions,
    pub mpc: MpcConfig,
}

impl Default for MidgameOptions {
    fn default() -> Self {
        MidgameOptions {
            selectivity: Selectivity::default(),
            variable_endgame: true,
            solver_start_depth: 6,
            abort_check_depth: 8,
            book_margin: 3,
            trace_search: false,
            table: TableOptions::default(),
            mpc: MpcConfig::default(),
        }
    }
}

impl MidgameOptions {
    pub fn with_selectivity(mut self, selectivity: Selectivity) -> Self {
        self.selectivity = selectivity;
        self
    }

    pub fn with_variable_endgame(mut self, enabled: bool) -> Self {
        self.variable_endgame = enabled;
        self
    }

    pub fn with_trace_search(mut self, enabled: bool) -> Self {
        self.trace_search = enabled;
        self
    }

    pub fn with_table(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }

    pub fn with_mpc(mut self, mpc: MpcConfig) -> Self {
        self.mpc = mpc;
        self
    }

    pub fn with_abort_check_depth(mut self, depth: Depth) -> Self {
        self.abort_check_depth = depth;
        self
    }

    pub fn with_book_margin(mut self, margin: Depth) -> Self {
        self.book_margin = margin;
        self
    }

    /// Checks whether Multi-ProbCut is active.
    #[inline]
    pub fn uses_mpc(&self) -> bool {
        self.selectivity.is_enabled()
    }
}

impl FromStr for MidgameOptions {
    type Err = OptionsError;

    fn from_str(flags: &str) -> Result<Self, Self::Err> {
        let mut options = MidgameOptions::default();
        for c in flags.chars() {
            match c {
                'w' => options.selectivity = Selectivity::None,
                'S' => options.variable_endgame = false,
                'p' => options.trace_search = true,
                c => return Err(OptionsError::UnknownFlag(c)),
            }
        }
        Ok(options)
    }
}
