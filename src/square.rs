use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. File 0 = a, rank 0 = rank 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        if file < 8 && rank < 8 {
            Some(Square { rank, file })
        } else {
            None
        }
    }

    /// Build a square from indices already known to be on the board.
    pub(crate) fn at(rank: usize, file: usize) -> Square {
        debug_assert!(rank < 8 && file < 8, "square ({rank}, {file}) off the board");
        Square { rank: rank as u8, file: file as u8 }
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub(crate) fn row(self) -> usize {
        self.rank as usize
    }

    pub(crate) fn col(self) -> usize {
        self.file as usize
    }

    /// The square `dr` ranks and `df` files away, if it is on the board.
    pub fn offset(self, dr: i32, df: i32) -> Option<Square> {
        let r = self.rank as i32 + dr;
        let f = self.file as i32 + df;
        if (0..8).contains(&r) && (0..8).contains(&f) {
            Some(Square { rank: r as u8, file: f as u8 })
        } else {
            None
        }
    }

    /// a1 is dark, so light squares have odd file + rank.
    pub fn is_light(self) -> bool {
        (self.file + self.rank) % 2 == 1
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank) as char
    }

    /// Parse algebraic coordinates such as `e4`.
    pub fn parse(s: &str) -> Option<Square> {
        match s.as_bytes() {
            [f @ b'a'..=b'h', r @ b'1'..=b'8'] => Square::new(f - b'a', r - b'1'),
            _ => None,
        }
    }

    /// Every square, rank by rank from a1 to h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8usize).flat_map(|r| (0..8usize).map(move |c| Square::at(r, c)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
