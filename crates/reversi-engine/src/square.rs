use std::fmt;
use std::str::FromStr;

use crate::bitboard::Bitboard;

/// A square on the 8x8 board, from A1 to H8.
///
/// Squares are indexed file-first, so bit `n` of a bitboard is square `n`:
///
/// ```text
///   A  B  C  D  E  F  G  H
/// 1 00 01 02 03 04 05 06 07
/// 2 08 09 10 11 12 13 14 15
/// 3 16 17 18 19 20 21 22 23
/// 4 24 25 26 27 28 29 30 31
/// 5 32 33 34 35 36 37 38 39
/// 6 40 41 42 43 44 45 46 47
/// 7 48 49 50 51 52 53 54 55
/// 8 56 57 58 59 60 61 62 63
/// ```
///
/// `None` doubles as the pass move and as the sentinel of the empty-square list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
    None,
}

/// Constants for board dimensions
pub const BOARD_SIZE: usize = 8;
pub const TOTAL_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

impl Square {
    /// Returns a bitboard with only this square set.
    ///
    /// # Returns
    ///
    /// A `Bitboard` with a single bit at this square. A1 is `0x1`, H8 is `0x8000000000000000`.
    #[inline(always)]
    pub fn bitboard(self) -> Bitboard {
        debug_assert!(
            (self as usize) < TOTAL_SQUARES,
            "Index out of bounds for Square enum. self: {self:?}"
        );
        Bitboard::from_square(self)
    }

    /// Converts the `Square` into a `usize` index (64 for `Square::None`).
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a `u8` value into a `Square` without bounds checking.
    ///
    /// # Arguments
    /// * `index` - The value to convert (0-63 for board squares, 64 for `None`).
    ///
    /// # Returns
    /// The corresponding `Square` variant.
    #[inline(always)]
    pub fn from_u8_unchecked(index: u8) -> Square {
        debug_assert!(
            index <= 64,
            "Index out of bounds for Square enum. index: {index:?}"
        );
        // SAFETY: `Square` is `repr(u8)` with contiguous discriminants 0..=64.
        unsafe { std::mem::transmute(index) }
    }

    /// Converts a `u32` value into a `Square` without bounds checking.
    #[inline(always)]
    pub fn from_u32_unchecked(index: u32) -> Square {
        Square::from_u8_unchecked(index as u8)
    }

    /// Converts a `usize` value into a `Square` without bounds checking.
    #[inline(always)]
    pub fn from_usize_unchecked(index: usize) -> Square {
        Square::from_u8_unchecked(index as u8)
    }

    /// Safely converts a `usize` value into a `Square`.
    ///
    /// # Arguments
    /// * `index` - The value to convert.
    ///
    /// # Returns
    /// `Some(Square)` if the index is valid (0-64), `None` otherwise.
    #[inline]
    pub fn from_usize(index: usize) -> Option<Square> {
        if index <= 64 {
            Some(Square::from_usize_unchecked(index))
        } else {
            None
        }
    }

    /// Returns the file (column) of this square, 0 for file A.
    ///
    /// # Panics
    ///
    /// Panics if called on `Square::None`.
    #[inline]
    pub fn file(self) -> usize {
        assert!(self != Square::None, "Square::file called on Square::None");
        self.index() % BOARD_SIZE
    }

    /// Returns the rank (row) of this square, 0 for rank 1.
    ///
    /// # Panics
    ///
    /// Panics if called on `Square::None`.
    #[inline]
    pub fn rank(self) -> usize {
        assert!(self != Square::None, "Square::rank called on Square::None");
        self.index() / BOARD_SIZE
    }

    /// Creates a `Square` from file and rank coordinates.
    ///
    /// # Arguments
    ///
    /// * `file` - The file index (0-7) where 0 is file A.
    /// * `rank` - The rank index (0-7) where 0 is rank 1.
    ///
    /// # Panics
    ///
    /// Panics if either `file` or `rank` is >= 8.
    pub fn from_file_rank(file: u8, rank: u8) -> Square {
        assert!(file < BOARD_SIZE as u8, "Invalid file: {file}");
        assert!(rank < BOARD_SIZE as u8, "Invalid rank: {rank}");
        Self::from_usize_unchecked(rank as usize * BOARD_SIZE + file as usize)
    }

    /// Returns an iterator over the 64 board squares, A1 to H8.
    #[inline]
    pub fn iter() -> impl Iterator<Item = Square> {
        (0..TOTAL_SQUARES as u8).map(Square::from_u8_unchecked)
    }
}

// Square::None is the pass move, so it must be the default rather than A1.
#[allow(clippy::derivable_impls)]
impl Default for Square {
    fn default() -> Self {
        Square::None
    }
}

/// Error type for parsing squares from algebraic notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SquareError {
    /// The input is not exactly two characters.
    #[error("invalid square format: must be 2 characters (e.g., 'a1')")]
    InvalidFormat,
    /// The file character is outside a-h.
    #[error("invalid file '{0}': must be a-h or A-H")]
    InvalidFile(char),
    /// The rank character is outside 1-8.
    #[error("invalid rank '{0}': must be 1-8")]
    InvalidRank(char),
}

impl FromStr for Square {
    type Err = SquareError;

    /// Parses a square in algebraic notation (e.g. "d3"). Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(SquareError::InvalidFormat);
        };

        let file = file_char.to_ascii_lowercase();
        if !('a'..='h').contains(&file) {
            return Err(SquareError::InvalidFile(file_char));
        }
        if !('1'..='8').contains(&rank_char) {
            return Err(SquareError::InvalidRank(rank_char));
        }

        Ok(Square::from_file_rank(file as u8 - b'a', rank_char as u8 - b'1'))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Square::None {
            return write!(f, "pass");
        }

        let file = (self.file() as u8 + b'a') as char;
        let rank = (self.rank() as u8 + b'1') as char;
        write!(f, "{file}{rank}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitboard() {
        assert_eq!(Square::A1.bitboard().bits(), 1);
        assert_eq!(Square::H8.bitboard().bits(), 0x8000000000000000);
        assert_eq!(Square::D5.bitboard().bits(), 1 << 35);
    }

    #[test]
    fn test_index_round_trip() {
        assert_eq!(Square::from_usize_unchecked(0), Square::A1);
        assert_eq!(Square::from_usize_unchecked(8), Square::A2);
        assert_eq!(Square::from_usize_unchecked(63), Square::H8);
        assert_eq!(Square::None.index(), 64);
        assert_eq!(Square::from_usize(64), Some(Square::None));
        assert_eq!(Square::from_usize(65), None);
    }

    #[test]
    fn test_file_rank() {
        assert_eq!(Square::D4.file(), 3);
        assert_eq!(Square::D4.rank(), 3);
        assert_eq!(Square::H1.file(), 7);
        assert_eq!(Square::A8.rank(), 7);
        for sq in Square::iter() {
            assert_eq!(Square::from_file_rank(sq.file() as u8, sq.rank() as u8), sq);
        }
    }

    #[test]
    #[should_panic(expected = "Square::file called on Square::None")]
    fn test_file_panics_on_none() {
        let _ = Square::None.file();
    }

    #[test]
    #[should_panic(expected = "Invalid rank: 8")]
    fn test_from_file_rank_invalid_rank() {
        let _ = Square::from_file_rank(0, 8);
    }

    #[test]
    fn test_iter() {
        let squares: Vec<Square> = Square::iter().collect();
        assert_eq!(squares.len(), 64);
        assert_eq!(squares[0], Square::A1);
        assert_eq!(squares[63], Square::H8);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("a1".parse::<Square>(), Ok(Square::A1));
        assert_eq!("H8".parse::<Square>(), Ok(Square::H8));
        assert_eq!(" d3 ".parse::<Square>(), Ok(Square::D3));
        assert_eq!("".parse::<Square>(), Err(SquareError::InvalidFormat));
        assert_eq!("abc".parse::<Square>(), Err(SquareError::InvalidFormat));
        assert_eq!("z1".parse::<Square>(), Err(SquareError::InvalidFile('z')));
        assert_eq!("a0".parse::<Square>(), Err(SquareError::InvalidRank('0')));
    }

    #[test]
    fn test_display() {
        assert_eq!(Square::A1.to_string(), "a1");
        assert_eq!(Square::F5.to_string(), "f5");
        assert_eq!(Square::None.to_string(), "pass");
        for sq in Square::iter() {
            assert_eq!(sq.to_string().parse::<Square>(), Ok(sq));
        }
    }

    #[test]
    fn test_default() {
        assert_eq!(Square::default(), Square::None);
    }
}
