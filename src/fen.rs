//! Forsyth-Edwards Notation for setting up and printing positions.

use crate::board::{Board, CastlingRights};
use crate::error::{ChessError, ChessResult};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn fen_error(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen { reason: reason.into() }
}

impl Board {
    /// Parse a FEN string. The halfmove clock and fullmove number may be
    /// omitted; they default to 0 and 1.
    pub fn from_fen(fen: &str) -> ChessResult<Board> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(fen_error(format!("expected 4 to 6 fields, found {}", fields.len())));
        }

        let mut board = Board::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(fen_error(format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(fen_error(format!("bad empty-square count {c}")));
                    }
                    file += skip as usize;
                } else {
                    let piece = Piece::from_fen_char(c)
                        .ok_or_else(|| fen_error(format!("unknown piece {c:?}")))?;
                    if file >= 8 {
                        return Err(fen_error(format!("rank {} is too long", rank + 1)));
                    }
                    board.set_piece(Square::at(rank, file), Some(piece));
                    file += 1;
                }
                if file > 8 {
                    return Err(fen_error(format!("rank {} is too long", rank + 1)));
                }
            }
            if file != 8 {
                return Err(fen_error(format!("rank {} has {file} squares", rank + 1)));
            }
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(fen_error(format!("bad side to move {other:?}"))),
        };

        board.castling_rights = CastlingRights::NONE;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => board.castling_rights.white_kingside = true,
                    'Q' => board.castling_rights.white_queenside = true,
                    'k' => board.castling_rights.black_kingside = true,
                    'q' => board.castling_rights.black_queenside = true,
                    _ => return Err(fen_error(format!("bad castling flag {c:?}"))),
                }
            }
        }
        board.drop_unsupported_castling_rights();

        board.en_passant_target = match fields[3] {
            "-" => None,
            text => Some(Square::parse(text).ok_or_else(|| fen_error(format!("bad en-passant square {text:?}")))?),
        };

        if let Some(text) = fields.get(4) {
            board.halfmove_clock = text
                .parse()
                .map_err(|_| fen_error(format!("bad halfmove clock {text:?}")))?;
        }
        if let Some(text) = fields.get(5) {
            board.fullmove_number = text
                .parse::<u32>()
                .map_err(|_| fen_error(format!("bad fullmove number {text:?}")))?
                .max(1);
        }

        board.validate()?;
        board.reset_history();
        Ok(board)
    }

    /// Castling flags without the king and rook on their home squares are
    /// meaningless; clear them.
    fn drop_unsupported_castling_rights(&mut self) {
        let has = |sq: (usize, usize), piece: Piece| self.squares[sq.0][sq.1] == Some(piece);
        let wk = Piece::new(PieceType::King, Color::White);
        let bk = Piece::new(PieceType::King, Color::Black);
        let wr = Piece::new(PieceType::Rook, Color::White);
        let br = Piece::new(PieceType::Rook, Color::Black);
        let rights = CastlingRights {
            white_kingside: self.castling_rights.white_kingside && has((0, 4), wk) && has((0, 7), wr),
            white_queenside: self.castling_rights.white_queenside && has((0, 4), wk) && has((0, 0), wr),
            black_kingside: self.castling_rights.black_kingside && has((7, 4), bk) && has((7, 7), br),
            black_queenside: self.castling_rights.black_queenside && has((7, 4), bk) && has((7, 0), br),
        };
        self.castling_rights = rights;
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.squares[rank][file] {
                    Some(p) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(p.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let c = self.castling_rights;
        let mut castling: String = [
            (c.white_kingside, 'K'),
            (c.white_queenside, 'Q'),
            (c.black_kingside, 'k'),
            (c.black_queenside, 'q'),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, ch)| *ch)
        .collect();
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .en_passant_target
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{placement} {side} {castling} {ep} {} {}",
            self.halfmove_clock, self.fullmove_number
        )
    }
}
