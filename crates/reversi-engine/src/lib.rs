//! Reversi search engine: bitboard move generation, an exact endgame solver and
//! a selective midgame searcher.

pub mod bitboard;
pub mod board;
pub mod constants;
pub mod disc;
mod empty_list;
pub mod eval;
pub mod flip;
mod move_sorter;
pub mod perft;
pub mod probcut;
pub mod search;
pub mod square;
pub mod symmetry;
pub mod transposition_table;
pub mod types;
