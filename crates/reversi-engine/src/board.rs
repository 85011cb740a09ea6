//! Positions as a pair of disc sets, seen from the side to move.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

use crate::bitboard::Bitboard;
use crate::disc::Disc;
use crate::flip;
use crate::square::{Square, TOTAL_SQUARES};
use crate::symmetry::Symmetry;
use crate::types::Score;

/// An Othello position.
///
/// The position is always stored from the point of view of the side to move:
/// `player` holds the mover's discs and `opponent` the other side's. The two
/// masks never overlap, and every square in neither mask is empty.
///
/// The ordering compares `player` first, then `opponent`. It exists so that a
/// canonical representative can be chosen among the symmetric images of a board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Board {
    /// Discs of the side to move.
    pub player: Bitboard,
    /// Discs of the side that just moved.
    pub opponent: Bitboard,
}

/// Error type for parsing a board from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The text does not hold exactly 64 squares.
    #[error("invalid board length {0}: expected 64 squares")]
    InvalidLength(usize),
    /// The text holds a character that is not a disc.
    #[error("invalid disc character '{0}'")]
    InvalidChar(char),
    /// The side to move was given as `Disc::Empty`.
    #[error("side to move must be black or white")]
    NoSideToMove,
}

impl Default for Board {
    /// The starting position with Black (d5, e4) to move against White (d4, e5).
    fn default() -> Self {
        Board {
            player: Square::D5.bitboard() | Square::E4.bitboard(),
            opponent: Square::D4.bitboard() | Square::E5.bitboard(),
        }
    }
}

impl Board {
    /// The starting position.
    pub fn new() -> Board {
        Default::default()
    }

    /// Builds a position from the mover's and the other side's discs, which
    /// must not overlap.
    pub fn from_bitboards(player: impl Into<Bitboard>, opponent: impl Into<Bitboard>) -> Board {
        let board = Board {
            player: player.into(),
            opponent: opponent.into(),
        };
        debug_assert!((board.player & board.opponent).is_empty());
        board
    }

    /// Parses a board from 64 disc characters, A1 first and H8 last.
    ///
    /// Whitespace is ignored, so the text may be laid out as an 8x8 grid.
    ///
    /// # Arguments
    /// * `board_string` - The disc characters (`X`, `O`, `-`).
    /// * `side_to_move` - Which colour is to move; its discs become `player`.
    ///
    /// # Returns
    /// The parsed board, or a [`BoardError`] describing the first problem found.
    pub fn from_string(board_string: &str, side_to_move: Disc) -> Result<Board, BoardError> {
        if side_to_move == Disc::Empty {
            return Err(BoardError::NoSideToMove);
        }

        let mut player = Bitboard::EMPTY;
        let mut opponent = Bitboard::EMPTY;
        let mut count = 0;
        for c in board_string.chars().filter(|c| !c.is_whitespace()) {
            let disc = Disc::from_char(c).ok_or(BoardError::InvalidChar(c))?;
            if count < TOTAL_SQUARES {
                let sq = Square::from_usize_unchecked(count);
                if disc == side_to_move {
                    player = player.set(sq);
                } else if disc != Disc::Empty {
                    opponent = opponent.set(sq);
                }
            }
            count += 1;
        }

        if count != TOTAL_SQUARES {
            return Err(BoardError::InvalidLength(count));
        }
        Ok(Board { player, opponent })
    }

    /// Returns the disc on a square, given the colour of the side to move.
    pub fn get_disc_at(&self, sq: Square, side_to_move: Disc) -> Disc {
        if self.player.contains(sq) {
            side_to_move
        } else if self.opponent.contains(sq) {
            side_to_move.opposite()
        } else {
            Disc::Empty
        }
    }

    /// Checks if neither side has a legal move.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        !self.has_legal_moves() && !self.switch_players().has_legal_moves()
    }

    /// Returns a bitboard of the empty squares.
    #[inline(always)]
    pub fn get_empty(&self) -> Bitboard {
        !(self.player | self.opponent)
    }

    /// Returns the number of discs of the side to move.
    #[inline(always)]
    pub fn get_player_count(&self) -> u32 {
        self.player.count()
    }

    /// Returns the number of discs of the opponent.
    #[inline(always)]
    pub fn get_opponent_count(&self) -> u32 {
        self.opponent.count()
    }

    /// Returns the number of empty squares.
    #[inline(always)]
    pub fn get_empty_count(&self) -> u32 {
        self.get_empty().count()
    }

    /// Final score of a finished game from the mover's point of view.
    ///
    /// Empty squares are not awarded to either side.
    ///
    /// # Returns
    /// `popcount(player) - popcount(opponent)`.
    #[inline(always)]
    pub fn terminal_score(&self) -> Score {
        self.player.count() as Score - self.opponent.count() as Score
    }

    /// The same discs with the other side to move, as after a pass.
    #[inline(always)]
    pub fn switch_players(&self) -> Board {
        Board {
            player: self.opponent,
            opponent: self.player,
        }
    }

    /// Plays `sq` if it is legal.
    ///
    /// # Returns
    /// The position after the move, from the new mover's point of view, or
    /// `None` for a pass, an occupied square or a move that flips nothing.
    #[inline]
    pub fn try_make_move(&self, sq: Square) -> Option<Board> {
        if sq == Square::None || !self.get_empty().contains(sq) {
            return None;
        }

        let flipped = flip::flip(sq, self.player, self.opponent);
        if flipped.is_empty() {
            return None;
        }

        Some(self.make_move_with_flipped(flipped, sq))
    }

    /// Plays a legal move (checked in debug builds only) and hands the turn over.
    #[inline(always)]
    pub fn make_move(&self, sq: Square) -> Board {
        let flipped = flip::flip(sq, self.player, self.opponent);
        debug_assert!(!flipped.is_empty());
        self.make_move_with_flipped(flipped, sq)
    }

    /// Like [`make_move`](Self::make_move), reusing flips the caller already has.
    #[inline(always)]
    pub fn make_move_with_flipped(&self, flipped: Bitboard, sq: Square) -> Board {
        Board {
            player: self.opponent.apply_flip(flipped),
            opponent: self.player.apply_move(flipped, sq),
        }
    }

    /// Legal moves of the side to move.
    #[inline(always)]
    pub fn get_moves(&self) -> Bitboard {
        self.player.get_moves(self.opponent)
    }

    #[inline(always)]
    pub fn has_legal_moves(&self) -> bool {
        !self.get_moves().is_empty()
    }

    #[inline(always)]
    pub fn is_legal_move(&self, sq: Square) -> bool {
        sq != Square::None && self.get_moves().contains(sq)
    }

    /// Empty squares next to at least one opponent disc.
    #[inline(always)]
    pub fn get_potential_moves(&self) -> Bitboard {
        self.player.get_potential_moves(self.opponent)
    }

    /// Computes a 64-bit hash of the position for table indexing.
    #[inline(always)]
    pub fn hash(&self) -> u64 {
        use rapidhash::v3;
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.player.bits().to_le_bytes());
        bytes[8..].copy_from_slice(&self.opponent.bits().to_le_bytes());
        v3::rapidhash_v3_nano_inline::<true, false>(&bytes, &v3::DEFAULT_RAPID_SECRETS)
    }

    /// Applies a board symmetry to both sides.
    #[inline]
    pub fn transform(&self, sym: Symmetry) -> Board {
        Board {
            player: sym.apply(self.player),
            opponent: sym.apply(self.opponent),
        }
    }

    /// Returns the smallest of the eight symmetric images of this board.
    ///
    /// # Returns
    /// `(canonical, sym)` where `canonical == self.transform(sym)`. Positions that
    /// are reflections of each other share the same canonical board.
    pub fn canonical(&self) -> (Board, Symmetry) {
        let mut best = (*self, Symmetry::Identity);
        for sym in &Symmetry::ALL[1..] {
            let image = self.transform(*sym);
            if image < best.0 {
                best = (image, *sym);
            }
        }
        best
    }

    /// Plays random legal moves from the start position until `n_empties` squares
    /// remain, retrying when a game ends early.
    ///
    /// The returned position is never finished: at least one side can move.
    ///
    /// # Arguments
    /// * `n_empties` - Number of empty squares wanted (at most 60).
    /// * `rng` - Source of randomness; a seeded `StdRng` gives reproducible positions.
    pub fn random_position(n_empties: u32, rng: &mut StdRng) -> Board {
        debug_assert!((1..=60).contains(&n_empties));
        loop {
            let mut board = Board::new();
            while board.get_empty_count() > n_empties {
                if !board.has_legal_moves() {
                    board = board.switch_players();
                    if !board.has_legal_moves() {
                        break;
                    }
                }
                match board.get_moves().iter().choose(rng) {
                    Some(sq) => board = board.make_move(sq),
                    None => break,
                }
            }
            if board.get_empty_count() == n_empties && !board.is_game_over() {
                return board;
            }
        }
    }

    /// Formats the board as an 8x8 grid, one rank per line.
    ///
    /// # Arguments
    /// * `side_to_move` - The colour of the side to move, which decides `X` or `O`.
    pub fn to_string_as_board(&self, side_to_move: Disc) -> String {
        let mut s = String::with_capacity(64 + 8);
        for (i, sq) in Square::iter().enumerate() {
            if i > 0 && i % 8 == 0 {
                s.push('\n');
            }
            s.push(self.get_disc_at(sq, side_to_move).to_char());
        }
        s
    }
}

impl fmt::Display for Board {
    /// Formats the board for display, showing Black as the current player.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_as_board(Disc::Black))
    }
}
