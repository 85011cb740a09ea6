//! Disc flip calculation for move execution.
//!
//! Flips are computed with kindergarten lookup tables. Each of the four lines
//! through the target square (row, column, diagonal, anti-diagonal) is gathered
//! into one byte per side, the flipped byte is read from a table indexed by
//! `(position in line, player byte, opponent byte)`, and the result is scattered
//! back onto the board.

use std::sync::LazyLock;

use crate::bitboard::Bitboard;
use crate::square::Square;

const FILE_A: u64 = 0x0101010101010101;

/// Multiplier that gathers the A-file into the top byte, rank 1 at bit 56.
const COLUMN_GATHER: u64 = 0x0102040810204080;

/// Multiplier that gathers a diagonal (one bit per file) into the top byte.
const DIAGONAL_GATHER: u64 = 0x0101010101010101;

/// Diagonal (A1-H8 direction) through each square.
static DIAG_MASKS: [u64; 64] = build_diagonal_masks(false);

/// Anti-diagonal (A8-H1 direction) through each square.
static ANTI_DIAG_MASKS: [u64; 64] = build_diagonal_masks(true);

/// Spreads a byte back onto the A-file, bit k to rank k.
static COLUMN_SPREAD: [u64; 256] = build_column_spread();

/// Flipped discs within one line, indexed by `pos << 16 | player << 8 | opponent`.
static LINE_FLIPS: LazyLock<Box<[u8]>> = LazyLock::new(build_line_flips);

const fn build_diagonal_masks(anti: bool) -> [u64; 64] {
    let mut masks = [0u64; 64];
    let mut sq = 0;
    while sq < 64 {
        let (file, rank) = ((sq % 8) as i32, (sq / 8) as i32);
        let mut other = 0;
        while other < 64 {
            let (f, r) = ((other % 8) as i32, (other / 8) as i32);
            let on_line = if anti {
                f + r == file + rank
            } else {
                f - r == file - rank
            };
            if on_line {
                masks[sq] |= 1 << other;
            }
            other += 1;
        }
        sq += 1;
    }
    masks
}

const fn build_column_spread() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut k = 0;
        while k < 8 {
            if byte & (1 << k) != 0 {
                table[byte] |= 1 << (8 * k);
            }
            k += 1;
        }
        byte += 1;
    }
    table
}

/// Computes the flips of one 8-square line by walking outward from `pos`.
fn line_flips(pos: usize, player: u8, opponent: u8) -> u8 {
    let mut flipped = 0u8;

    let mut run = 0u8;
    let mut i = pos + 1;
    while i < 8 && opponent & (1 << i) != 0 {
        run |= 1 << i;
        i += 1;
    }
    if i < 8 && player & (1 << i) != 0 {
        flipped |= run;
    }

    run = 0;
    let mut i = pos as i32 - 1;
    while i >= 0 && opponent & (1 << i) != 0 {
        run |= 1 << i;
        i -= 1;
    }
    if i >= 0 && player & (1 << i) != 0 {
        flipped |= run;
    }

    flipped
}

fn build_line_flips() -> Box<[u8]> {
    let mut table = vec![0u8; 8 << 16];
    for pos in 0..8 {
        for player in 0..256usize {
            for opponent in 0..256usize {
                // The target square is empty, and the two sides never share a square.
                if player & opponent != 0 || (player | opponent) & (1 << pos) != 0 {
                    continue;
                }
                table[(pos << 16) | (player << 8) | opponent] =
                    line_flips(pos, player as u8, opponent as u8);
            }
        }
    }
    table.into_boxed_slice()
}

#[inline(always)]
fn lookup(table: &[u8], pos: usize, player: u64, opponent: u64) -> u64 {
    table[(pos << 16) | ((player as usize) << 8) | opponent as usize] as u64
}

#[inline(always)]
fn gather_column(bb: u64, file: usize) -> u64 {
    ((bb >> file) & FILE_A).wrapping_mul(COLUMN_GATHER) >> 56
}

#[inline(always)]
fn gather_diagonal(bb: u64, mask: u64) -> u64 {
    (bb & mask).wrapping_mul(DIAGONAL_GATHER) >> 56
}

/// Calculates which opponent discs would be flipped by placing a disc at the given square.
///
/// # Arguments
///
/// * `sq` - The square where the disc is being placed. Must be empty.
/// * `player` - Bitboard representing the current player's discs
/// * `opponent` - Bitboard representing the opponent's discs
///
/// # Returns
///
/// A bitboard representing all opponent discs that would be flipped by this move.
/// Returns an empty bitboard if no discs would be flipped (illegal move).
#[inline]
pub fn flip(sq: Square, player: Bitboard, opponent: Bitboard) -> Bitboard {
    debug_assert!(sq != Square::None);
    debug_assert!(!(player | opponent).contains(sq));

    let table: &[u8] = &LINE_FLIPS;
    let (p, o) = (player.bits(), opponent.bits());
    let (file, rank) = (sq.file(), sq.rank());
    let index = sq.index();

    let shift = 8 * rank;
    let row = lookup(table, file, (p >> shift) & 0xff, (o >> shift) & 0xff) << shift;

    let col_byte = lookup(table, rank, gather_column(p, file), gather_column(o, file));
    let column = COLUMN_SPREAD[col_byte as usize] << file;

    let diag_mask = DIAG_MASKS[index];
    let diag_byte = lookup(
        table,
        file,
        gather_diagonal(p, diag_mask),
        gather_diagonal(o, diag_mask),
    );
    let diag = diag_byte.wrapping_mul(DIAGONAL_GATHER) & diag_mask;

    let anti_mask = ANTI_DIAG_MASKS[index];
    let anti_byte = lookup(
        table,
        file,
        gather_diagonal(p, anti_mask),
        gather_diagonal(o, anti_mask),
    );
    let anti = anti_byte.wrapping_mul(DIAGONAL_GATHER) & anti_mask;

    Bitboard::new(row | column | diag | anti)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::disc::Disc;
    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};

    /// Walks all eight rays from `sq` one square at a time.
    fn flip_by_rays(sq: Square, player: Bitboard, opponent: Bitboard) -> Bitboard {
        let mut flipped = Bitboard::EMPTY;
        let (file, rank) = (sq.file() as i32, sq.rank() as i32);
        for (df, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (-1, -1), (1, -1), (-1, 1)] {
            let mut run = Bitboard::EMPTY;
            let (mut f, mut r) = (file + df, rank + dr);
            while (0..8).contains(&f) && (0..8).contains(&r) {
                let s = Square::from_file_rank(f as u8, r as u8);
                if opponent.contains(s) {
                    run = run.set(s);
                } else {
                    if player.contains(s) {
                        flipped |= run;
                    }
                    break;
                }
                f += df;
                r += dr;
            }
        }
        flipped
    }

    #[test]
    fn test_flip_initial_position() {
        let p = Square::D5.bitboard() | Square::E4.bitboard();
        let o = Square::D4.bitboard() | Square::E5.bitboard();
        assert_eq!(flip(Square::C4, p, o), Square::D4.bitboard());
        assert_eq!(flip(Square::D3, p, o), Square::D4.bitboard());
        assert_eq!(flip(Square::E6, p, o), Square::E5.bitboard());
        assert_eq!(flip(Square::F5, p, o), Square::E5.bitboard());
        assert!(flip(Square::A1, p, o).is_empty());
    }

    #[test]
    fn test_flip_long_diagonal() {
        let board = Board::from_string(
            "XXXXXXXOXOOXXXXOXOXXXOXOXOOXOXXOXOXOOOXOXOOOOOXOXOOOXXXO-X-OXOOO",
            Disc::Black,
        )
        .unwrap();
        let flipped = flip(Square::A8, board.player, board.opponent);
        let expected = Square::B7.bitboard()
            | Square::C6.bitboard()
            | Square::D5.bitboard()
            | Square::E4.bitboard()
            | Square::F3.bitboard();
        assert_eq!(flipped, expected);
    }

    #[test]
    fn test_flip_all_directions() {
        // Opponent ring around d3, closed by player discs two squares out.
        let opponent = Bitboard::new(0x000000001c141c00);
        let player = [
            Square::B1,
            Square::D1,
            Square::F1,
            Square::B3,
            Square::F3,
            Square::B5,
            Square::D5,
            Square::F5,
        ]
        .into_iter()
        .fold(Bitboard::EMPTY, Bitboard::set);
        let flipped = flip(Square::D3, player, opponent);
        assert_eq!(flipped, opponent);
        assert_eq!(flipped, flip_by_rays(Square::D3, player, opponent));
    }

    #[test]
    fn test_flip_matches_ray_walk() {
        let mut rng = StdRng::seed_from_u64(0x9e37_79b9);
        for _ in 0..2000 {
            let occupied = rng.random::<u64>() & rng.random::<u64>();
            let player = Bitboard::new(occupied & rng.random::<u64>());
            let opponent = Bitboard::new(occupied) & !player;
            for sq in !(player | opponent) {
                assert_eq!(
                    flip(sq, player, opponent),
                    flip_by_rays(sq, player, opponent),
                    "square {sq}\n{player}\n{opponent}"
                );
            }
        }
    }
}
