//! Everything a move history needs to print a move in Standard Algebraic
//! Notation, worked out before the move is played.

use std::fmt;

use serde::Serialize;

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::movegen::{has_legal_move_in_place, is_in_check, legal_moves};
use crate::moves::Move;
use crate::piece::PieceType;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveDescription {
    pub mv: Move,
    pub piece: PieceType,
    pub capture: bool,
    /// Another piece of the same type could reach the same square, and the
    /// origin file (and/or rank) is needed to tell them apart.
    pub disambiguate_file: bool,
    pub disambiguate_rank: bool,
    pub check: bool,
    pub checkmate: bool,
}

/// Describe a legal move on `board`. Fails with `IllegalMove` otherwise.
pub fn describe_move(board: &Board, mv: &Move) -> ChessResult<MoveDescription> {
    let legal = legal_moves(board);
    let mv = *legal
        .iter()
        .find(|m| m.same_coordinates(mv))
        .ok_or_else(|| ChessError::IllegalMove { text: mv.to_uci() })?;
    let piece = board
        .piece_at(mv.from)
        .map(|p| p.piece_type)
        .ok_or_else(|| ChessError::IllegalMove { text: mv.to_uci() })?;

    let (mut disambiguate_file, mut disambiguate_rank) = (false, false);
    if piece != PieceType::Pawn && piece != PieceType::King {
        let rivals: Vec<&Move> = legal
            .iter()
            .filter(|m| {
                m.to == mv.to
                    && m.from != mv.from
                    && board.piece_at(m.from).map(|p| p.piece_type) == Some(piece)
            })
            .collect();
        if !rivals.is_empty() {
            if rivals.iter().all(|m| m.from.file() != mv.from.file()) {
                disambiguate_file = true;
            } else if rivals.iter().all(|m| m.from.rank() != mv.from.rank()) {
                disambiguate_rank = true;
            } else {
                disambiguate_file = true;
                disambiguate_rank = true;
            }
        }
    }

    let mut after = board.clone();
    after.make_move(&mv);
    let check = is_in_check(&after, after.side_to_move());
    let checkmate = check && !has_legal_move_in_place(&mut after);

    Ok(MoveDescription {
        mv,
        piece,
        capture: mv.flags.capture,
        disambiguate_file,
        disambiguate_rank,
        check,
        checkmate,
    })
}

impl fmt::Display for MoveDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mv = &self.mv;
        if mv.flags.castle_kingside {
            f.write_str("O-O")?;
        } else if mv.flags.castle_queenside {
            f.write_str("O-O-O")?;
        } else {
            if self.piece == PieceType::Pawn {
                if self.capture {
                    write!(f, "{}", mv.from.file_char())?;
                }
            } else {
                write!(f, "{}", self.piece.letter().to_ascii_uppercase())?;
                if self.disambiguate_file {
                    write!(f, "{}", mv.from.file_char())?;
                }
                if self.disambiguate_rank {
                    write!(f, "{}", mv.from.rank_char())?;
                }
            }
            if self.capture {
                f.write_str("x")?;
            }
            write!(f, "{}", mv.to)?;
            if let Some(pt) = mv.promotion {
                write!(f, "={}", pt.letter().to_ascii_uppercase())?;
            }
        }
        if self.checkmate {
            f.write_str("#")
        } else if self.check {
            f.write_str("+")
        } else {
            Ok(())
        }
    }
}

/// SAN text for a legal move.
pub fn to_san(board: &Board, mv: &Move) -> ChessResult<String> {
    Ok(describe_move(board, mv)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::parse_move;

    fn san(fen: &str, text: &str) -> String {
        let board = Board::from_fen(fen).expect("valid FEN");
        let mv = parse_move(&board, text).expect("legal move");
        to_san(&board, &mv).unwrap()
    }

    const START: &str = crate::fen::STARTING_FEN;

    #[test]
    fn pawn_and_piece_moves() {
        assert_eq!(san(START, "e2e4"), "e4");
        assert_eq!(san(START, "g1f3"), "Nf3");
    }

    #[test]
    fn captures() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(san(fen, "e4d5"), "exd5");
        assert_eq!(san("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1", "d5e6"), "dxe6");
    }

    #[test]
    fn disambiguation_by_file_then_rank() {
        // Knights on b1 and f3 can both reach d2.
        assert_eq!(san("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1", "b1d2"), "Nbd2");
        // Rooks on a1 and a5 share a file.
        assert_eq!(san("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1", "a1a3"), "R1a3");
        // Queens on a1, a3 and c1 all see b2.
        assert_eq!(san("4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1", "a1b2"), "Qa1b2");
    }

    #[test]
    fn castling_promotion_and_check_marks() {
        assert_eq!(san("r3k3/8/8/8/8/8/8/4K2R w K - 0 1", "e1g1"), "O-O");
        assert_eq!(san("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1", "e1c1"), "O-O-O");
        assert_eq!(san("7k/P7/8/8/8/8/8/K7 w - - 0 1", "a7a8q"), "a8=Q+");
        assert_eq!(san("6k1/5ppp/8/8/8/8/8/3R2K1 w - - 0 1", "d1d8"), "Rd8#");
    }

    #[test]
    fn fools_mate_is_marked_mate() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2";
        assert_eq!(san(fen, "d8h4"), "Qh4#");
    }

    #[test]
    fn description_carries_the_raw_facts() {
        let board = Board::new();
        let mv = parse_move(&board, "b1c3").unwrap();
        let desc = describe_move(&board, &mv).unwrap();
        assert_eq!(desc.piece, PieceType::Knight);
        assert!(!desc.capture && !desc.check && !desc.checkmate);
        assert!(!desc.disambiguate_file && !desc.disambiguate_rank);
    }
}
