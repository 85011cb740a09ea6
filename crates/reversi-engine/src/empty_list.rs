//! # Empty Square List
//!
//! The endgame solver walks the empty squares of a position far more often than it
//! plays moves, so it keeps them in a doubly-linked list over a fixed arena of 65
//! slots: one per square plus a sentinel at index 64 (`Square::None`). Links are
//! square indices, so removal and restoration are O(1) relinks and a restore
//! exactly reverses the matching removal.
//!
//! The list also tracks the region parity of the empties: the XOR of the quadrant
//! IDs of all empty squares. A set bit means that quadrant holds an odd number of
//! empties.

use crate::board::Board;
use crate::square::Square;

/// Quadrant bit-mask for each square position
///
/// - Top-left (A1-D4): 1
/// - Top-right (E1-H4): 2
/// - Bottom-left (A5-D8): 4
/// - Bottom-right (E5-H8): 8
#[rustfmt::skip]
pub const QUADRANT_ID: [u8; 64] = [
    1, 1, 1, 1, 2, 2, 2, 2,
    1, 1, 1, 1, 2, 2, 2, 2,
    1, 1, 1, 1, 2, 2, 2, 2,
    1, 1, 1, 1, 2, 2, 2, 2,
    4, 4, 4, 4, 8, 8, 8, 8,
    4, 4, 4, 4, 8, 8, 8, 8,
    4, 4, 4, 4, 8, 8, 8, 8,
    4, 4, 4, 4, 8, 8, 8, 8,
];

/// Static visiting order: corners first, then edges, inner squares, and the
/// squares next to corners and the centre last.
#[rustfmt::skip]
pub const PRESORTED: [Square; 64] = [
    Square::A1, Square::H1, Square::A8, Square::H8,
    Square::C1, Square::F1, Square::A3, Square::H3,
    Square::A6, Square::H6, Square::C8, Square::F8,
    Square::C3, Square::F3, Square::C6, Square::F6,
    Square::D1, Square::E1, Square::A4, Square::H4,
    Square::A5, Square::H5, Square::D8, Square::E8,
    Square::D3, Square::E3, Square::C4, Square::F4,
    Square::C5, Square::F5, Square::D6, Square::E6,
    Square::D2, Square::E2, Square::B4, Square::G4,
    Square::B5, Square::G5, Square::D7, Square::E7,
    Square::C2, Square::F2, Square::B3, Square::G3,
    Square::B6, Square::G6, Square::C7, Square::F7,
    Square::B1, Square::G1, Square::A2, Square::H2,
    Square::A7, Square::H7, Square::B8, Square::G8,
    Square::B2, Square::G2, Square::B7, Square::G7,
    Square::D4, Square::E4, Square::D5, Square::E5,
];

const SENTINEL: u8 = Square::None as u8;

/// Arena slot. Links are square indices; 64 is the sentinel.
#[derive(Clone, Copy)]
struct EmptyNode {
    next: u8,
    prev: u8,
}

impl Default for EmptyNode {
    fn default() -> Self {
        EmptyNode {
            next: SENTINEL,
            prev: SENTINEL,
        }
    }
}

/// Doubly-linked list of the empty squares in [`PRESORTED`] order.
#[derive(Clone)]
pub struct EmptyList {
    nodes: [EmptyNode; 65],
    /// Number of empty squares currently in the list.
    pub count: u32,
    /// XOR of the quadrant IDs of the listed squares.
    pub parity: u8,
}

impl EmptyList {
    /// Creates a list holding the empty squares of `board`.
    pub fn new(board: &Board) -> Self {
        let mut list = EmptyList {
            nodes: [EmptyNode::default(); 65],
            count: 0,
            parity: 0,
        };

        let empty = board.get_empty();
        let mut prev = SENTINEL;
        for sq in PRESORTED.iter().copied().filter(|&sq| empty.contains(sq)) {
            let idx = sq as u8;
            list.nodes[prev as usize].next = idx;
            list.nodes[idx as usize].prev = prev;
            list.parity ^= QUADRANT_ID[idx as usize];
            list.count += 1;
            prev = idx;
        }
        list.nodes[prev as usize].next = SENTINEL;
        list.nodes[SENTINEL as usize].prev = prev;
        list
    }

    /// Returns the first empty square, or `Square::None` if the list is empty.
    #[inline(always)]
    pub fn first(&self) -> Square {
        Square::from_u8_unchecked(self.nodes[SENTINEL as usize].next)
    }

    /// Returns the square after `sq`, or `Square::None` if `sq` is the last.
    #[inline(always)]
    pub fn next(&self, sq: Square) -> Square {
        Square::from_u8_unchecked(self.nodes[sq.index()].next)
    }

    /// Unlinks `sq`. It must currently be in the list.
    #[inline(always)]
    pub fn remove(&mut self, sq: Square) {
        let node = self.nodes[sq.index()];
        self.nodes[node.prev as usize].next = node.next;
        self.nodes[node.next as usize].prev = node.prev;
        self.parity ^= QUADRANT_ID[sq.index()];
        self.count -= 1;
    }

    /// Relinks `sq` where it was removed from.
    ///
    /// Removals must be restored in reverse order; the node of `sq` still holds
    /// its old neighbours.
    #[inline(always)]
    pub fn restore(&mut self, sq: Square) {
        let node = self.nodes[sq.index()];
        let idx = sq as u8;
        self.nodes[node.prev as usize].next = idx;
        self.nodes[node.next as usize].prev = idx;
        self.parity ^= QUADRANT_ID[sq.index()];
        self.count += 1;
    }

    /// Checks whether `sq` lies in a quadrant with an odd number of empties.
    #[inline(always)]
    pub fn is_odd_region(&self, sq: Square) -> bool {
        self.parity & QUADRANT_ID[sq.index()] != 0
    }

    /// Iterates the listed squares in order.
    #[inline]
    pub fn iter(&self) -> EmptyListIter<'_> {
        EmptyListIter {
            list: self,
            current: self.first(),
        }
    }

    /// Collects the listed squares into a bitboard.
    #[cfg(test)]
    pub fn to_bitboard(&self) -> crate::bitboard::Bitboard {
        use crate::bitboard::Bitboard;
        self.iter().fold(Bitboard::EMPTY, Bitboard::set)
    }
}

/// Iterator over an [`EmptyList`].
pub struct EmptyListIter<'a> {
    list: &'a EmptyList,
    current: Square,
}

impl Iterator for EmptyListIter<'_> {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Square> {
        if self.current == Square::None {
            return None;
        }
        let sq = self.current;
        self.current = self.list.next(sq);
        Some(sq)
    }
}
