use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::movegen::{self, is_in_check};
use crate::piece::{Color, PieceType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMove,
    ThreefoldRepetition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
    Draw(DrawReason),
}

impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }

    /// The side delivering mate.
    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            _ => None,
        }
    }

    /// PGN-style score: `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub fn score_text(self) -> &'static str {
        match self {
            GameResult::Ongoing => "*",
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Ongoing => write!(f, "ongoing"),
            GameResult::WhiteWins => write!(f, "White wins by checkmate"),
            GameResult::BlackWins => write!(f, "Black wins by checkmate"),
            GameResult::Draw(DrawReason::Stalemate) => write!(f, "Draw by stalemate"),
            GameResult::Draw(DrawReason::InsufficientMaterial) => {
                write!(f, "Draw by insufficient material")
            }
            GameResult::Draw(DrawReason::FiftyMove) => write!(f, "Draw by the fifty-move rule"),
            GameResult::Draw(DrawReason::ThreefoldRepetition) => write!(f, "Draw by repetition"),
        }
    }
}

/// Classify the position for the side to move.
///
/// Checkmate and stalemate take precedence over the draw rules, so a mate
/// delivered on the hundredth halfmove still wins.
pub fn game_status(board: &Board) -> GameResult {
    let no_moves = !movegen::has_legal_move(board);
    status_with(board, no_moves)
}

/// [`game_status`] for callers that already know whether legal moves exist.
pub(crate) fn status_with(board: &Board, no_moves: bool) -> GameResult {
    let side = board.side_to_move();
    if no_moves {
        return if is_in_check(board, side) {
            match side {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            }
        } else {
            GameResult::Draw(DrawReason::Stalemate)
        };
    }
    if has_insufficient_material(board) {
        GameResult::Draw(DrawReason::InsufficientMaterial)
    } else if board.halfmove_clock() >= 100 {
        GameResult::Draw(DrawReason::FiftyMove)
    } else if board.repetition_count() >= 3 {
        GameResult::Draw(DrawReason::ThreefoldRepetition)
    } else {
        GameResult::Ongoing
    }
}

/// Neither side can ever mate: bare kings, a single minor piece, or only
/// bishops that all stand on one square colour.
pub fn has_insufficient_material(board: &Board) -> bool {
    let mut minors = 0;
    let mut knights = 0;
    let mut bishop_on_light = false;
    let mut bishop_on_dark = false;
    for (sq, p) in board.pieces() {
        match p.piece_type {
            PieceType::King => {}
            PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            PieceType::Knight => {
                minors += 1;
                knights += 1;
            }
            PieceType::Bishop => {
                minors += 1;
                if sq.is_light() {
                    bishop_on_light = true;
                } else {
                    bishop_on_dark = true;
                }
            }
        }
    }
    minors <= 1 || (knights == 0 && !(bishop_on_light && bishop_on_dark))
}
