//! Set-of-squares type over a `u64`.
//!
//! Bit `n` is square `n` (A1 = 0, H8 = 63), so set algebra on squares is plain
//! integer arithmetic. Move generation lives here as well because it is a pure
//! function of two disc sets.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::square::Square;

const CORNERS: u64 = 0x8100_0000_0000_0081;
const X_SQUARES: u64 = 0x0042_0000_0000_4200;

/// Edge masks for the four move-generation axes, as `(shift, mask)`.
///
/// A run that reaches the edge of the board along an axis must not wrap onto the
/// next rank, so the opponent discs it may cross are clipped per axis.
const AXES: [(u32, u64); 4] = [
    (1, 0x7e7e_7e7e_7e7e_7e7e),
    (8, 0x00ff_ffff_ffff_ff00),
    (7, 0x007e_7e7e_7e7e_7e00),
    (9, 0x007e_7e7e_7e7e_7e00),
];

/// A set of squares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Every square. Used as "no restriction" where a move mask is expected.
    pub const ALL: Bitboard = Bitboard(u64::MAX);

    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Bitboard(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1 << sq as u8)
    }

    #[inline(always)]
    pub fn set(self, sq: Square) -> Self {
        self | sq.bitboard()
    }

    #[inline(always)]
    pub fn remove(self, sq: Square) -> Self {
        self & !sq.bitboard()
    }

    #[inline(always)]
    pub fn contains(self, sq: Square) -> bool {
        !(self & sq.bitboard()).is_empty()
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of squares in the set.
    #[inline(always)]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Lowest square of the set, or `None` when it is empty.
    #[inline(always)]
    pub fn lsb_square(self) -> Option<Square> {
        (!self.is_empty()).then(|| self.lsb_square_unchecked())
    }

    /// Lowest square of the set. The set must not be empty.
    #[inline(always)]
    pub fn lsb_square_unchecked(self) -> Square {
        debug_assert!(!self.is_empty());
        Square::from_u32_unchecked(self.0.trailing_zeros())
    }

    /// Mirror across the horizontal midline (rank 1 and rank 8 swap).
    #[inline(always)]
    pub fn flip_vertical(self) -> Self {
        Bitboard(self.0.swap_bytes())
    }

    /// Mirror across the vertical midline (file A and file H swap).
    #[inline(always)]
    pub fn flip_horizontal(self) -> Self {
        let mut b = self.0;
        b = ((b >> 1) & 0x5555_5555_5555_5555) | ((b & 0x5555_5555_5555_5555) << 1);
        b = ((b >> 2) & 0x3333_3333_3333_3333) | ((b & 0x3333_3333_3333_3333) << 2);
        b = ((b >> 4) & 0x0f0f_0f0f_0f0f_0f0f) | ((b & 0x0f0f_0f0f_0f0f_0f0f) << 4);
        Bitboard(b)
    }

    /// Mirror across the A1-H8 diagonal.
    #[inline(always)]
    pub fn flip_diag_a1h8(self) -> Self {
        let b = delta_swap(self.0, 0x0f0f_0f0f_0000_0000, 28);
        let b = delta_swap(b, 0x3333_0000_3333_0000, 14);
        Bitboard(delta_swap(b, 0x5500_5500_5500_5500, 7))
    }

    /// Mirror across the A8-H1 diagonal.
    #[inline(always)]
    pub fn flip_diag_a8h1(self) -> Self {
        let b = delta_swap(self.0, 0xf0f0_f0f0_0000_0000, 36);
        let b = delta_swap(b, 0xcccc_0000_cccc_0000, 18);
        Bitboard(delta_swap(b, 0xaa00_aa00_aa00_aa00, 9))
    }

    #[inline(always)]
    pub fn rotate_90_clockwise(self) -> Self {
        self.flip_diag_a8h1().flip_vertical()
    }

    #[inline(always)]
    pub fn rotate_180_clockwise(self) -> Self {
        Bitboard(self.0.reverse_bits())
    }

    #[inline(always)]
    pub fn rotate_270_clockwise(self) -> Self {
        self.flip_diag_a1h8().flip_vertical()
    }

    /// Square count with corners counted twice, the mobility measure used for
    /// move ordering.
    #[inline(always)]
    pub fn corner_weighted_count(self) -> u32 {
        self.count() + self.corners().count()
    }

    #[inline(always)]
    pub const fn corners(self) -> Self {
        Bitboard(self.0 & CORNERS)
    }

    /// The squares diagonally next to a corner (B2, G2, B7, G7).
    #[inline(always)]
    pub const fn x_squares(self) -> Self {
        Bitboard(self.0 & X_SQUARES)
    }

    /// Everything except corners and X-squares.
    #[inline(always)]
    pub const fn ordinary_squares(self) -> Self {
        Bitboard(self.0 & !(CORNERS | X_SQUARES))
    }

    /// Squares of the set, lowest first.
    #[inline(always)]
    pub fn iter(self) -> BitboardIterator {
        BitboardIterator { bitboard: self }
    }

    /// The mover's discs after placing on `sq` and flipping `flipped`.
    #[inline(always)]
    pub fn apply_move(self, flipped: Bitboard, sq: Square) -> Bitboard {
        self ^ flipped ^ sq.bitboard()
    }

    /// The other side's discs after losing `flipped`.
    #[inline(always)]
    pub fn apply_flip(self, flipped: Bitboard) -> Bitboard {
        self ^ flipped
    }

    /// Counts the discs of this set that can never be flipped because they sit
    /// on a corner or on an edge square next to an owned corner.
    ///
    /// Reference: <https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/board.c#L1453>
    #[inline(always)]
    pub fn corner_stability(self) -> u32 {
        let p = self.0;
        let stable = (((0x0100_0000_0000_0001 & p) << 1)
            | ((0x8000_0000_0000_0080 & p) >> 1)
            | ((0x0000_0000_0000_0081 & p) << 8)
            | ((0x8100_0000_0000_0000 & p) >> 8)
            | CORNERS)
            & p;
        stable.count_ones()
    }

    /// Legal moves of the side owning `self` against `opponent`.
    ///
    /// Runs of opponent discs are grown from the mover's discs along each axis,
    /// both directions at once; a legal move is an empty square just past a run.
    ///
    /// Reference: <https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/board.c#L822>
    #[inline(always)]
    pub fn get_moves(self, opponent: Bitboard) -> Bitboard {
        let (p, o) = (self.0, opponent.0);
        let mut moves = 0;
        for (dir, edge) in AXES {
            let mask = o & edge;
            let mut run = ((p << dir) | (p >> dir)) & mask;
            for _ in 0..5 {
                run |= ((run << dir) | (run >> dir)) & mask;
            }
            moves |= (run << dir) | (run >> dir);
        }
        Bitboard(moves & !(p | o))
    }

    /// Empty squares touching at least one opponent disc.
    ///
    /// Reference: <https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/board.c#L944>
    #[inline(always)]
    pub fn get_potential_moves(self, opponent: Bitboard) -> Bitboard {
        let (p, o) = (self.0, opponent.0);
        let neighbours = AXES
            .iter()
            .fold(0, |acc, &(dir, edge)| acc | ((o & edge) << dir) | ((o & edge) >> dir));
        Bitboard(neighbours & !(p | o))
    }
}

macro_rules! impl_bit_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $tok:tt) => {
        impl $op for Bitboard {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Bitboard(self.0 $tok rhs.0)
            }
        }

        impl $assign for Bitboard {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $tok rhs;
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl From<u64> for Bitboard {
    #[inline(always)]
    fn from(bits: u64) -> Self {
        Bitboard(bits)
    }
}

impl From<Square> for Bitboard {
    #[inline(always)]
    fn from(sq: Square) -> Self {
        sq.bitboard()
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIterator;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One rank per line, A1 at the top left; `1` marks a member square.
impl std::fmt::Display for Bitboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in 0..8 {
            let line: String = (0..8)
                .map(|file| if self.0 >> (rank * 8 + file) & 1 != 0 { '1' } else { '.' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Swaps the bits selected by `mask` with the bits `delta` places above them.
#[inline(always)]
fn delta_swap(bits: u64, mask: u64, delta: u32) -> u64 {
    let tmp = mask & (bits ^ (bits << delta));
    bits ^ tmp ^ (tmp >> delta)
}

/// Iterator over the squares of a [`Bitboard`], lowest first.
pub struct BitboardIterator {
    bitboard: Bitboard,
}

impl Iterator for BitboardIterator {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Square> {
        let sq = self.bitboard.lsb_square()?;
        self.bitboard = Bitboard(self.bitboard.0 & (self.bitboard.0 - 1));
        Some(sq)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bitboard.count() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIterator {}

#[cfg(test)]
mod tests {
    use super::*;

    const START_PLAYER: u64 = 0x0000000810000000;
    const START_OPPONENT: u64 = 0x0000001008000000;

    #[test]
    fn test_get_moves_initial_position() {
        let moves = Bitboard::new(START_PLAYER).get_moves(Bitboard::new(START_OPPONENT));
        let expected = Square::D3.bitboard()
            | Square::C4.bitboard()
            | Square::F5.bitboard()
            | Square::E6.bitboard();
        assert_eq!(moves, expected);
    }

    #[test]
    fn test_get_moves_no_moves() {
        let player = Bitboard::new(0x0000000000000001);
        let opponent = Bitboard::new(0x8000000000000000);
        assert!(player.get_moves(opponent).is_empty());
    }

    #[test]
    fn test_get_moves_does_not_wrap_around_edges() {
        // H1 player, A2 opponent: a horizontal shift would wrap into B2 without edge masks.
        let player = Square::H1.bitboard();
        let opponent = Square::A2.bitboard();
        assert!(player.get_moves(opponent).is_empty());
    }

    #[test]
    fn test_get_potential_moves_initial_position() {
        let potential = Bitboard::new(START_PLAYER).get_potential_moves(Bitboard::new(START_OPPONENT));
        // Empty squares touching d4 or e5.
        assert_eq!(potential.bits(), 0x00003824241c0000);
        assert!(potential.contains(Square::C3));
        assert!(potential.contains(Square::F6));
        assert_eq!(potential.count(), 10);
    }

    #[test]
    fn test_corner_stability() {
        assert_eq!(Bitboard::new(0).corner_stability(), 0);
        assert_eq!(Square::A1.bitboard().corner_stability(), 1);
        let a1_b1_a2 = Square::A1.bitboard() | Square::B1.bitboard() | Square::A2.bitboard();
        assert_eq!(a1_b1_a2.corner_stability(), 3);
        // B1 without A1 is not stable.
        assert_eq!(Square::B1.bitboard().corner_stability(), 0);
    }

    #[test]
    fn test_iterator() {
        let bb = Square::A1.bitboard() | Square::D4.bitboard() | Square::H8.bitboard();
        let squares: Vec<Square> = bb.iter().collect();
        assert_eq!(squares, vec![Square::A1, Square::D4, Square::H8]);
        assert_eq!(bb.iter().len(), 3);
        assert_eq!(Bitboard::EMPTY.iter().next(), None);
    }

    #[test]
    fn test_flip_vertical_and_horizontal() {
        assert_eq!(Square::A1.bitboard().flip_vertical(), Square::A8.bitboard());
        assert_eq!(Square::A1.bitboard().flip_horizontal(), Square::H1.bitboard());
        assert_eq!(Square::C2.bitboard().flip_horizontal(), Square::F2.bitboard());
    }

    #[test]
    fn test_diagonal_flips() {
        assert_eq!(Square::B1.bitboard().flip_diag_a1h8(), Square::A2.bitboard());
        assert_eq!(Square::H8.bitboard().flip_diag_a1h8(), Square::H8.bitboard());
        assert_eq!(Square::A1.bitboard().flip_diag_a8h1(), Square::H8.bitboard());
        assert_eq!(Square::B1.bitboard().flip_diag_a8h1(), Square::H7.bitboard());
    }

    #[test]
    fn test_rotations_compose() {
        let bb = Bitboard::new(0x0123456789abcdef);
        assert_eq!(bb.rotate_90_clockwise().rotate_270_clockwise(), bb);
        assert_eq!(
            bb.rotate_90_clockwise().rotate_90_clockwise(),
            bb.rotate_180_clockwise()
        );
        assert_eq!(bb.rotate_180_clockwise().rotate_180_clockwise(), bb);
        assert_eq!(bb.flip_diag_a1h8().flip_diag_a1h8(), bb);
        assert_eq!(bb.flip_diag_a8h1().flip_diag_a8h1(), bb);
    }

    #[test]
    fn test_square_classes() {
        let all = Bitboard::new(u64::MAX);
        assert_eq!(all.corners().count(), 4);
        assert_eq!(all.x_squares().count(), 4);
        assert_eq!(all.ordinary_squares().count(), 56);
        assert_eq!(all.corner_weighted_count(), 68);
    }

    #[test]
    fn test_apply_move() {
        let player = Square::D4.bitboard();
        let flipped = Square::D5.bitboard();
        assert_eq!(
            player.apply_move(flipped, Square::D6),
            Square::D4.bitboard() | Square::D5.bitboard() | Square::D6.bitboard()
        );
    }

    #[test]
    fn test_lsb_square() {
        let bb = Square::C3.bitboard() | Square::F6.bitboard();
        assert_eq!(bb.lsb_square(), Some(Square::C3));
        assert_eq!(bb.remove(Square::C3).lsb_square(), Some(Square::F6));
        assert_eq!(Bitboard::EMPTY.lsb_square(), None);
    }
}
