//! The eight symmetries of the square board.

use crate::bitboard::Bitboard;
use crate::square::Square;

/// A rotation or reflection of the board (the dihedral group of order 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Symmetry {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipVertical,
    FlipHorizontal,
    FlipDiagA1H8,
    FlipDiagA8H1,
}

impl Symmetry {
    /// All eight symmetries, identity first.
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::FlipVertical,
        Symmetry::FlipHorizontal,
        Symmetry::FlipDiagA1H8,
        Symmetry::FlipDiagA8H1,
    ];

    /// Applies this symmetry to a bitboard.
    #[inline]
    pub fn apply(self, bb: Bitboard) -> Bitboard {
        match self {
            Symmetry::Identity => bb,
            Symmetry::Rotate90 => bb.rotate_90_clockwise(),
            Symmetry::Rotate180 => bb.rotate_180_clockwise(),
            Symmetry::Rotate270 => bb.rotate_270_clockwise(),
            Symmetry::FlipVertical => bb.flip_vertical(),
            Symmetry::FlipHorizontal => bb.flip_horizontal(),
            Symmetry::FlipDiagA1H8 => bb.flip_diag_a1h8(),
            Symmetry::FlipDiagA8H1 => bb.flip_diag_a8h1(),
        }
    }

    /// Maps a square through this symmetry. `Square::None` maps to itself.
    #[inline]
    pub fn apply_square(self, sq: Square) -> Square {
        if sq == Square::None {
            return sq;
        }
        self.apply(sq.bitboard()).lsb_square_unchecked()
    }

    /// Returns the symmetry that undoes this one.
    ///
    /// Only the quarter turns differ from their inverse; every reflection and the
    /// half turn are involutions.
    #[inline]
    pub fn inverse(self) -> Symmetry {
        match self {
            Symmetry::Rotate90 => Symmetry::Rotate270,
            Symmetry::Rotate270 => Symmetry::Rotate90,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_undoes_apply() {
        let bb = Bitboard::new(0x00f0_1020_3c08_4201);
        for sym in Symmetry::ALL {
            assert_eq!(sym.inverse().apply(sym.apply(bb)), bb, "{sym:?}");
            for sq in Square::iter() {
                assert_eq!(sym.inverse().apply_square(sym.apply_square(sq)), sq);
            }
        }
    }

    #[test]
    fn test_symmetries_are_distinct() {
        // A1 and B1 together pin down each transform.
        let probe = Square::A1.bitboard() | Square::B1.bitboard();
        let images: Vec<Bitboard> = Symmetry::ALL.iter().map(|s| s.apply(probe)).collect();
        for i in 0..images.len() {
            for j in i + 1..images.len() {
                assert_ne!(images[i], images[j]);
            }
        }
    }

    #[test]
    fn test_apply_square() {
        assert_eq!(Symmetry::FlipVertical.apply_square(Square::B1), Square::B8);
        assert_eq!(Symmetry::FlipHorizontal.apply_square(Square::B1), Square::G1);
        assert_eq!(Symmetry::Rotate180.apply_square(Square::A1), Square::H8);
        assert_eq!(Symmetry::FlipDiagA1H8.apply_square(Square::B1), Square::A2);
        assert_eq!(Symmetry::Identity.apply_square(Square::None), Square::None);
    }
}
