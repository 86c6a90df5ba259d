use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, ChessResult};
use crate::piece::PieceType;
use crate::square::Square;

/// What kind of move this is, beyond its squares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveFlags {
    pub capture: bool,
    pub en_passant: bool,
    pub castle_kingside: bool,
    pub castle_queenside: bool,
}

impl MoveFlags {
    pub const QUIET: MoveFlags = MoveFlags {
        capture: false,
        en_passant: false,
        castle_kingside: false,
        castle_queenside: false,
    };

    pub const CAPTURE: MoveFlags = MoveFlags { capture: true, ..MoveFlags::QUIET };

    pub const EN_PASSANT: MoveFlags = MoveFlags {
        capture: true,
        en_passant: true,
        ..MoveFlags::QUIET
    };

    pub const CASTLE_KINGSIDE: MoveFlags = MoveFlags { castle_kingside: true, ..MoveFlags::QUIET };

    pub const CASTLE_QUEENSIDE: MoveFlags = MoveFlags { castle_queenside: true, ..MoveFlags::QUIET };

    pub fn is_castle(&self) -> bool {
        self.castle_kingside || self.castle_queenside
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(from: Square, to: Square, promotion: Option<PieceType>, flags: MoveFlags) -> Self {
        Move { from, to, promotion, flags }
    }

    pub fn quiet(from: Square, to: Square) -> Self {
        Move::new(from, to, None, MoveFlags::QUIET)
    }

    /// Convert to coordinate notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(pt) => format!("{}{}{}", self.from, self.to, pt.letter()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// True when `from`, `to` and `promotion` agree, whatever the flags say.
    pub fn same_coordinates(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Parse coordinate notation into its squares and promotion piece.
///
/// Only checks the grammar; whether the move is legal is up to
/// [`crate::movegen::parse_move`].
pub fn parse_coordinates(text: &str) -> ChessResult<(Square, Square, Option<PieceType>)> {
    let invalid = || ChessError::InvalidFormat { text: text.to_string() };
    let trimmed = text.trim();
    if !trimmed.is_ascii() || !(4..=5).contains(&trimmed.len()) {
        return Err(invalid());
    }

    let from = Square::parse(&trimmed[0..2]).ok_or_else(invalid)?;
    let to = Square::parse(&trimmed[2..4]).ok_or_else(invalid)?;
    let promotion = match trimmed.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(PieceType::Queen),
        Some(b'r') => Some(PieceType::Rook),
        Some(b'b') => Some(PieceType::Bishop),
        Some(b'n') => Some(PieceType::Knight),
        Some(_) => return Err(invalid()),
    };
    Ok((from, to, promotion))
}
