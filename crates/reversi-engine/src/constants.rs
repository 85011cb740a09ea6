//! Global constants

use crate::types::Score;

/// Number of squares on the Reversi board.
pub const BOARD_SQUARES: usize = 64;

/// Maximum possible score (disc difference).
pub const SCORE_MAX: Score = 64;

/// Minimum possible score (disc difference).
pub const SCORE_MIN: Score = -64;

/// Infinity for disc-valued search windows and table bounds.
pub const SCORE_INF: Score = 65;

/// Centi-discs per disc in midgame scores.
pub const DISK_VALUE: Score = 100;

/// Largest midgame score a real game outcome can take.
pub const MID_SCORE_MAX: Score = SCORE_MAX * DISK_VALUE;

/// Infinity for centi-disc search windows and table bounds.
pub const MID_SCORE_INF: Score = SCORE_INF * DISK_VALUE;
