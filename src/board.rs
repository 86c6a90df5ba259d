use serde::{Deserialize, Serialize};

use crate::error::{ChessError, ChessResult};
use crate::movegen;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// A move touching a rook's home corner (leaving it or capturing on it)
    /// loses the right to castle with that rook.
    fn revoke_corner(&mut self, sq: Square) {
        match (sq.rank(), sq.file()) {
            (0, 0) => self.white_queenside = false,
            (0, 7) => self.white_kingside = false,
            (7, 0) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            _ => {}
        }
    }
}

/// Everything `make_move` overwrites, so `unmake_move` can put it back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Undo {
    mv: Move,
    moved: Piece,
    captured: Option<Piece>,
    castling_rights: CastlingRights,
    en_passant_target: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// A chess position plus the move history needed to undo moves and detect
/// repetitions.
///
/// Only legal moves reach a board through [`Board::apply`]; the search uses
/// the crate-internal `make_move`/`unmake_move` pair on its own copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Board {
    pub(crate) squares: [[Option<Piece>; 8]; 8],
    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    history: Vec<Undo>,
    position_history: Vec<u64>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Only useful as a starting point
    /// for FEN setup.
    pub(crate) fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
            position_history: Vec::new(),
        }
    }

    /// The standard initial arrangement, White to move.
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (col, &pt) in back_rank.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(pt, Color::White));
            board.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[7][col] = Some(Piece::new(pt, Color::Black));
        }
        board.castling_rights = CastlingRights::ALL;
        board.reset_history();
        board
    }

    /// Forget recorded moves and start repetition tracking at this position.
    pub(crate) fn reset_history(&mut self) {
        self.history.clear();
        self.position_history.clear();
        self.position_history.push(self.position_key());
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row()][sq.col()]
    }

    pub(crate) fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.row()][sq.col()] = piece;
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Moves applied since the board was created, oldest first.
    pub fn moves_played(&self) -> impl Iterator<Item = &Move> {
        self.history.iter().map(|u| &u.mv)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last().map(|u| &u.mv)
    }

    /// All pieces with their squares, a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        movegen::is_in_check(self, self.side_to_move)
    }

    /// Commit a legal move. The board is left untouched when `mv` is not
    /// among the legal moves; flags on `mv` are ignored in favour of the
    /// generated move's.
    pub fn apply(&mut self, mv: &Move) -> ChessResult<()> {
        let legal = movegen::legal_moves(self)
            .into_iter()
            .find(|m| m.same_coordinates(mv))
            .ok_or_else(|| ChessError::IllegalMove { text: mv.to_uci() })?;
        self.make_move(&legal);
        Ok(())
    }

    /// Take back the last applied move, returning it.
    pub fn undo(&mut self) -> ChessResult<Move> {
        self.unmake_move().ok_or(ChessError::NothingToUndo)
    }

    /// Play a pseudo-legal move without any legality check.
    pub(crate) fn make_move(&mut self, mv: &Move) {
        let moved = self
            .piece_at(mv.from)
            .unwrap_or_else(|| panic!("no piece on {} to play {}", mv.from, mv));
        let captured_sq = if mv.flags.en_passant {
            Square::at(mv.from.row(), mv.to.col())
        } else {
            mv.to
        };
        let captured = self.piece_at(captured_sq);

        self.history.push(Undo {
            mv: *mv,
            moved,
            captured,
            castling_rights: self.castling_rights,
            en_passant_target: self.en_passant_target,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });

        self.set_piece(captured_sq, None);
        self.set_piece(mv.from, None);
        let placed = match mv.promotion {
            Some(pt) => Piece::new(pt, moved.color),
            None => moved,
        };
        self.set_piece(mv.to, Some(placed));

        // Castling also moves the rook
        let rank = mv.from.row();
        if mv.flags.castle_kingside {
            self.squares[rank][5] = self.squares[rank][7].take();
        } else if mv.flags.castle_queenside {
            self.squares[rank][3] = self.squares[rank][0].take();
        }

        if moved.piece_type == PieceType::King {
            self.castling_rights.revoke(moved.color);
        }
        self.castling_rights.revoke_corner(mv.from);
        self.castling_rights.revoke_corner(mv.to);

        let is_pawn_move = moved.piece_type == PieceType::Pawn;
        self.en_passant_target = if is_pawn_move && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            Some(Square::at((mv.from.row() + mv.to.row()) / 2, mv.from.col()))
        } else {
            None
        };

        if is_pawn_move || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if moved.color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = moved.color.opposite();
        self.position_history.push(self.position_key());
    }

    /// Reverse the most recent `make_move`.
    pub(crate) fn unmake_move(&mut self) -> Option<Move> {
        let undo = self.history.pop()?;
        self.position_history.pop();
        let mv = undo.mv;

        self.set_piece(mv.to, None);
        self.set_piece(mv.from, Some(undo.moved));
        let captured_sq = if mv.flags.en_passant {
            Square::at(mv.from.row(), mv.to.col())
        } else {
            mv.to
        };
        self.set_piece(captured_sq, undo.captured);

        let rank = mv.from.row();
        if mv.flags.castle_kingside {
            self.squares[rank][7] = self.squares[rank][5].take();
        } else if mv.flags.castle_queenside {
            self.squares[rank][0] = self.squares[rank][3].take();
        }

        self.side_to_move = undo.moved.color;
        self.castling_rights = undo.castling_rights;
        self.en_passant_target = undo.en_passant_target;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        Some(mv)
    }

    /// Hash of everything that makes two positions the same for repetition
    /// purposes. The en-passant square only counts while a capture on it is
    /// actually possible.
    pub fn position_key(&self) -> u64 {
        let mut hash: u64 = 0;
        for (sq, p) in self.pieces() {
            let piece_index = p.piece_type as u64 + if p.color == Color::White { 0 } else { 6 };
            let sq_index = sq.row() as u64 * 8 + sq.col() as u64;
            hash ^= mix64(sq_index * 12 + piece_index + 1);
        }
        if self.side_to_move == Color::Black {
            hash ^= 0xdeadbeefcafe1234;
        }
        let c = self.castling_rights;
        for (i, right) in [c.white_kingside, c.white_queenside, c.black_kingside, c.black_queenside]
            .into_iter()
            .enumerate()
        {
            if right {
                hash ^= mix64(1_000 + i as u64);
            }
        }
        if let Some(ep) = self.capturable_en_passant() {
            hash ^= mix64(2_000 + ep.col() as u64);
        }
        hash
    }

    fn capturable_en_passant(&self) -> Option<Square> {
        let ep = self.en_passant_target?;
        let us = self.side_to_move;
        let pawn = Some(Piece::new(PieceType::Pawn, us));
        [-1, 1]
            .into_iter()
            .filter_map(|df| ep.offset(-us.pawn_direction(), df))
            .any(|sq| self.piece_at(sq) == pawn)
            .then_some(ep)
    }

    /// How many times the current position has occurred, counting now.
    pub fn repetition_count(&self) -> usize {
        let current = self
            .position_history
            .last()
            .copied()
            .unwrap_or_else(|| self.position_key());
        // Positions before the last pawn move or capture can never recur.
        let window = self.halfmove_clock as usize + 1;
        self.position_history
            .iter()
            .rev()
            .take(window)
            .filter(|&&h| h == current)
            .count()
    }

    /// Check the invariants every reachable position satisfies.
    pub fn validate(&self) -> ChessResult<()> {
        let invalid = |reason: String| Err(ChessError::InvalidPosition { reason });
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces()
                .filter(|(_, p)| p.piece_type == PieceType::King && p.color == color)
                .count();
            if kings != 1 {
                return invalid(format!("{color} has {kings} kings"));
            }
        }
        if let Some((sq, _)) = self
            .pieces()
            .find(|(sq, p)| p.piece_type == PieceType::Pawn && (sq.rank() == 0 || sq.rank() == 7))
        {
            return invalid(format!("pawn on back rank at {sq}"));
        }
        if movegen::is_in_check(self, self.side_to_move.opposite()) {
            return invalid(format!("{} is in check but not to move", self.side_to_move.opposite()));
        }
        if let Some(ep) = self.en_passant_target {
            let them = self.side_to_move.opposite();
            let expected_rank = if them == Color::White { 2 } else { 5 };
            let pushed = ep.offset(them.pawn_direction(), 0);
            let pawn_there = pushed.and_then(|sq| self.piece_at(sq))
                == Some(Piece::new(PieceType::Pawn, them));
            if ep.rank() != expected_rank || !pawn_there || self.piece_at(ep).is_some() {
                return invalid(format!("en-passant square {ep} does not follow a double push"));
            }
        }
        Ok(())
    }
}

/// SplitMix64 finalizer; spreads small integers into well-mixed keys.
fn mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{legal_moves, parse_move};

    fn play(board: &mut Board, moves: &[&str]) {
        for text in moves {
            let mv = parse_move(board, text).expect("legal move");
            board.apply(&mv).expect("apply legal move");
        }
    }

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn initial_position_is_valid() {
        let board = Board::new();
        assert!(board.validate().is_ok());
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.castling_rights(), CastlingRights::ALL);
        assert_eq!(board.piece_at(sq("e1")), Some(Piece::new(PieceType::King, Color::White)));
        assert_eq!(board.piece_at(sq("d8")), Some(Piece::new(PieceType::Queen, Color::Black)));
        assert_eq!(board.pieces().count(), 32);
    }

    #[test]
    fn apply_then_undo_restores_every_move_from_start() {
        let board = Board::new();
        for mv in legal_moves(&board) {
            let mut copy = board.clone();
            copy.apply(&mv).unwrap();
            assert_ne!(copy, board);
            assert_eq!(copy.undo(), Ok(mv));
            assert_eq!(copy, board, "undo of {mv} did not restore the board");
        }
    }

    #[test]
    fn undo_restores_castling_and_en_passant_state() {
        let mut board = Board::new();
        play(&mut board, &["e2e4", "d7d5", "e4e5", "f7f5", "g1f3", "a7a6", "f1e2", "a6a5"]);
        let before = board.clone();
        play(&mut board, &["e1g1"]);
        assert_eq!(board.piece_at(sq("f1")).map(|p| p.piece_type), Some(PieceType::Rook));
        assert!(!board.castling_rights().white_kingside);
        board.undo().unwrap();
        assert_eq!(board, before);

        let mut board = Board::new();
        play(&mut board, &["e2e4", "a7a6", "e4e5", "f7f5"]);
        let before = board.clone();
        play(&mut board, &["e5f6"]);
        assert_eq!(board.piece_at(sq("f5")), None);
        board.undo().unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn illegal_apply_leaves_board_unchanged() {
        let mut board = Board::new();
        let before = board.clone();
        let bogus = Move::quiet(sq("e2"), sq("e5"));
        assert!(matches!(board.apply(&bogus), Err(ChessError::IllegalMove { .. })));
        assert_eq!(board, before);
    }

    #[test]
    fn undo_on_fresh_board_fails() {
        let mut board = Board::new();
        assert_eq!(board.undo(), Err(ChessError::NothingToUndo));
    }

    #[test]
    fn en_passant_target_is_cleared_after_one_move() {
        let mut board = Board::new();
        play(&mut board, &["e2e4"]);
        assert_eq!(board.en_passant_target(), Some(sq("e3")));
        play(&mut board, &["g8f6"]);
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn halfmove_clock_counts_and_resets() {
        let mut board = Board::new();
        play(&mut board, &["g1f3", "g8f6", "b1c3"]);
        assert_eq!(board.halfmove_clock(), 3);
        assert_eq!(board.fullmove_number(), 2);
        play(&mut board, &["e7e5"]);
        assert_eq!(board.halfmove_clock(), 0);
        play(&mut board, &["f3e5"]);
        assert_eq!(board.halfmove_clock(), 0, "capture resets the clock");
    }

    #[test]
    fn rook_moves_and_captures_revoke_castling() {
        let mut board = Board::new();
        play(&mut board, &["h2h4", "a7a5", "h1h3"]);
        assert!(!board.castling_rights().white_kingside);
        assert!(board.castling_rights().white_queenside);
        play(&mut board, &["a8a6"]);
        assert!(!board.castling_rights().black_queenside);
        assert!(board.castling_rights().black_kingside);
    }

    #[test]
    fn repetition_counts_returns_to_a_position() {
        let mut board = Board::new();
        assert_eq!(board.repetition_count(), 1);
        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(board.repetition_count(), 2);
        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(board.repetition_count(), 3);
    }

    #[test]
    fn en_passant_key_only_matters_when_capturable() {
        // After 1.e4 no black pawn can take on e3, so the key matches the
        // same placement reached without a double push.
        let mut a = Board::new();
        play(&mut a, &["e2e4", "g8f6", "g1f3", "f6g8", "f3g1"]);
        let mut b = Board::new();
        play(&mut b, &["e2e4"]);
        assert_eq!(a.position_key(), b.position_key());
    }
}
