/// Colour of a disc, or an empty square.
///
/// Positions are stored relative to the side to move, so `Disc` only matters at the
/// text boundary where boards are parsed and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disc {
    Empty,
    Black,
    White,
}

impl Disc {
    /// Converts the disc to its character form: `'-'`, `'X'` or `'O'`.
    pub fn to_char(self) -> char {
        match self {
            Disc::Empty => '-',
            Disc::Black => 'X',
            Disc::White => 'O',
        }
    }

    /// Parses a disc character. `'*'` and `'.'` are accepted as aliases.
    ///
    /// # Returns
    ///
    /// `None` for any other character.
    pub fn from_char(c: char) -> Option<Disc> {
        match c {
            '-' | '.' => Some(Disc::Empty),
            'X' | 'x' | '*' => Some(Disc::Black),
            'O' | 'o' => Some(Disc::White),
            _ => None,
        }
    }

    /// Returns the opposite disc. `Empty` stays `Empty`.
    pub fn opposite(self) -> Disc {
        match self {
            Disc::Black => Disc::White,
            Disc::White => Disc::Black,
            Disc::Empty => Disc::Empty,
        }
    }
}
