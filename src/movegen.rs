//! Move generation and validation.
//!
//! Moves are generated square by square from a1 to h8 and, per piece, in a
//! fixed direction order, so the same board always yields the same sequence.

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::moves::{parse_coordinates, Move, MoveFlags};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

const STRAIGHT_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const DIAGONAL_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Moves obeying each piece's movement rules and occupancy, for the side to
/// move, without regard to whether they leave the mover's king in check.
pub fn pseudo_legal_moves(board: &Board) -> Vec<Move> {
    let color = board.side_to_move();
    let mut moves = Vec::with_capacity(48);

    for (from, piece) in board.pieces() {
        if piece.color != color {
            continue;
        }
        match piece.piece_type {
            PieceType::Pawn => pawn_moves(board, from, color, &mut moves),
            PieceType::Knight => step_moves(board, from, color, &KNIGHT_OFFSETS, &mut moves),
            PieceType::Bishop => sliding_moves(board, from, color, &DIAGONAL_DIRS, &mut moves),
            PieceType::Rook => sliding_moves(board, from, color, &STRAIGHT_DIRS, &mut moves),
            PieceType::Queen => {
                sliding_moves(board, from, color, &STRAIGHT_DIRS, &mut moves);
                sliding_moves(board, from, color, &DIAGONAL_DIRS, &mut moves);
            }
            PieceType::King => {
                step_moves(board, from, color, &KING_OFFSETS, &mut moves);
                castling_moves(board, from, color, &mut moves);
            }
        }
    }

    moves
}

/// Pseudo-legal moves that do not leave the mover's own king in check.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut scratch = board.clone();
    legal_moves_in_place(&mut scratch)
}

/// Same as [`legal_moves`], playing candidates on `board` itself and taking
/// each one back before returning.
pub(crate) fn legal_moves_in_place(board: &mut Board) -> Vec<Move> {
    let us = board.side_to_move();
    pseudo_legal_moves(board)
        .into_iter()
        .filter(|mv| {
            board.make_move(mv);
            let safe = !is_in_check(board, us);
            board.unmake_move();
            safe
        })
        .collect()
}

/// Whether the side to move has at least one legal move.
pub fn has_legal_move(board: &Board) -> bool {
    let mut scratch = board.clone();
    has_legal_move_in_place(&mut scratch)
}

/// Stops at the first legal move found, which is all a leaf needs to tell a
/// finished game from a running one.
pub(crate) fn has_legal_move_in_place(board: &mut Board) -> bool {
    let us = board.side_to_move();
    pseudo_legal_moves(board).iter().any(|mv| {
        board.make_move(mv);
        let safe = !is_in_check(board, us);
        board.unmake_move();
        safe
    })
}

/// Whether `color`'s king is attacked.
///
/// # Panics
///
/// If `color` has no king, which no reachable position allows.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let king = board
        .find_king(color)
        .unwrap_or_else(|| panic!("corrupt position: no {color} king on the board"));
    is_square_attacked_by(board, king, color.opposite())
}

/// Whether any piece of `attacker` attacks `sq`.
pub fn is_square_attacked_by(board: &Board, sq: Square, attacker: Color) -> bool {
    let holds = |target: Option<Square>, types: &[PieceType]| {
        target
            .and_then(|t| board.piece_at(t))
            .is_some_and(|p| p.color == attacker && types.contains(&p.piece_type))
    };

    if KNIGHT_OFFSETS.iter().any(|&(dr, df)| holds(sq.offset(dr, df), &[PieceType::Knight])) {
        return true;
    }
    if KING_OFFSETS.iter().any(|&(dr, df)| holds(sq.offset(dr, df), &[PieceType::King])) {
        return true;
    }

    // A pawn attacks diagonally forward, so look one rank behind `sq` from
    // the attacker's point of view.
    let back = -attacker.pawn_direction();
    if [-1, 1].iter().any(|&df| holds(sq.offset(back, df), &[PieceType::Pawn])) {
        return true;
    }

    let first_blocker = |dr: i32, df: i32| {
        let mut cur = sq.offset(dr, df);
        while let Some(t) = cur {
            if board.piece_at(t).is_some() {
                return Some(t);
            }
            cur = t.offset(dr, df);
        }
        None
    };
    STRAIGHT_DIRS
        .iter()
        .any(|&(dr, df)| holds(first_blocker(dr, df), &[PieceType::Rook, PieceType::Queen]))
        || DIAGONAL_DIRS
            .iter()
            .any(|&(dr, df)| holds(first_blocker(dr, df), &[PieceType::Bishop, PieceType::Queen]))
}

fn push_pawn_move(from: Square, to: Square, flags: MoveFlags, moves: &mut Vec<Move>) {
    if to.rank() == 0 || to.rank() == 7 {
        for pt in PieceType::PROMOTIONS {
            moves.push(Move::new(from, to, Some(pt), flags));
        }
    } else {
        moves.push(Move::new(from, to, None, flags));
    }
}

fn pawn_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Move>) {
    let dir = color.pawn_direction();
    let start_rank = if color == Color::White { 1 } else { 6 };

    if let Some(one) = from.offset(dir, 0) {
        if board.piece_at(one).is_none() {
            push_pawn_move(from, one, MoveFlags::QUIET, moves);
            if from.rank() == start_rank {
                if let Some(two) = one.offset(dir, 0) {
                    if board.piece_at(two).is_none() {
                        moves.push(Move::quiet(from, two));
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.offset(dir, df) else {
            continue;
        };
        match board.piece_at(to) {
            Some(p) if p.color != color => push_pawn_move(from, to, MoveFlags::CAPTURE, moves),
            None if board.en_passant_target() == Some(to) => {
                moves.push(Move::new(from, to, None, MoveFlags::EN_PASSANT));
            }
            _ => {}
        }
    }
}

/// Single-step pieces: knight and king.
fn step_moves(board: &Board, from: Square, color: Color, offsets: &[(i32, i32)], moves: &mut Vec<Move>) {
    for &(dr, df) in offsets {
        let Some(to) = from.offset(dr, df) else {
            continue;
        };
        match board.piece_at(to) {
            None => moves.push(Move::quiet(from, to)),
            Some(p) if p.color != color => moves.push(Move::new(from, to, None, MoveFlags::CAPTURE)),
            Some(_) => {}
        }
    }
}

/// Rays stop at the first occupied square, which is a capture when it holds
/// an enemy piece.
fn sliding_moves(board: &Board, from: Square, color: Color, directions: &[(i32, i32)], moves: &mut Vec<Move>) {
    for &(dr, df) in directions {
        let mut cur = from.offset(dr, df);
        while let Some(to) = cur {
            if let Some(p) = board.piece_at(to) {
                if p.color != color {
                    moves.push(Move::new(from, to, None, MoveFlags::CAPTURE));
                }
                break;
            }
            moves.push(Move::quiet(from, to));
            cur = to.offset(dr, df);
        }
    }
}

fn castling_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Move>) {
    let back_rank = color.back_rank() as usize;
    if from != Square::at(back_rank, 4) {
        return;
    }
    let rights = board.castling_rights();
    if !rights.kingside(color) && !rights.queenside(color) {
        return;
    }
    let enemy = color.opposite();
    if is_square_attacked_by(board, from, enemy) {
        return;
    }

    let rook = Some(Piece::new(PieceType::Rook, color));
    let empty = |cols: &[usize]| cols.iter().all(|&c| board.piece_at(Square::at(back_rank, c)).is_none());
    let safe = |cols: &[usize]| {
        cols.iter()
            .all(|&c| !is_square_attacked_by(board, Square::at(back_rank, c), enemy))
    };

    // King must not pass through or land on an attacked square
    if rights.kingside(color)
        && board.piece_at(Square::at(back_rank, 7)) == rook
        && empty(&[5, 6])
        && safe(&[5, 6])
    {
        moves.push(Move::new(from, Square::at(back_rank, 6), None, MoveFlags::CASTLE_KINGSIDE));
    }
    if rights.queenside(color)
        && board.piece_at(Square::at(back_rank, 0)) == rook
        && empty(&[1, 2, 3])
        && safe(&[2, 3])
    {
        moves.push(Move::new(from, Square::at(back_rank, 2), None, MoveFlags::CASTLE_QUEENSIDE));
    }
}

/// Turn coordinate text into one of the board's legal moves.
///
/// Fails with `InvalidFormat` when the text is not coordinate notation and
/// with `IllegalMove` when it is but names no legal move.
pub fn parse_move(board: &Board, text: &str) -> ChessResult<Move> {
    let (from, to, promotion) = parse_coordinates(text)?;
    legal_moves(board)
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promotion == promotion)
        .ok_or_else(|| ChessError::IllegalMove { text: text.trim().to_string() })
}

/// Count leaf nodes of the legal move tree to `depth` plies.
pub fn perft(board: &Board, depth: u32) -> u64 {
    let mut scratch = board.clone();
    perft_in_place(&mut scratch, depth)
}

fn perft_in_place(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves_in_place(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in &moves {
        board.make_move(mv);
        nodes += perft_in_place(board, depth - 1);
        board.unmake_move();
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fen(s: &str) -> Board {
        Board::from_fen(s).expect("valid FEN")
    }

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn twenty_moves_from_the_start() {
        let board = Board::new();
        assert_eq!(pseudo_legal_moves(&board).len(), 20);
        assert_eq!(legal_moves(&board).len(), 20);
    }

    #[test]
    fn generation_is_deterministic() {
        let board = fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        assert_eq!(legal_moves(&board), legal_moves(&board));
    }

    #[test]
    fn pinned_piece_cannot_move_off_the_pin() {
        // Bishop on e2 pinned by the rook on e8.
        let board = fen("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 1");
        let moves = legal_moves(&board);
        assert!(moves.iter().all(|m| m.from != sq("e2")));
        assert!(pseudo_legal_moves(&board).iter().any(|m| m.from == sq("e2")));
    }

    #[test]
    fn sliders_stop_at_first_piece() {
        let board = fen("7k/8/8/8/R2p3P/8/8/K7 w - - 0 1");
        let rook: Vec<Square> = legal_moves(&board)
            .iter()
            .filter(|m| m.from == sq("a4"))
            .map(|m| m.to)
            .collect();
        assert!(rook.contains(&sq("d4")), "captures the blocker");
        assert!(!rook.contains(&sq("e4")), "does not pass the blocker");
    }

    #[test]
    fn castling_through_attacked_square_is_not_generated() {
        // Black rook on f8 covers f1.
        let board = fen("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = legal_moves(&board);
        assert!(!moves.iter().any(|m| m.flags.castle_kingside));
        assert!(moves.iter().any(|m| m.flags.castle_queenside && m.to == sq("c1")));
    }

    #[test]
    fn no_castling_out_of_check() {
        let board = fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!legal_moves(&board).iter().any(|m| m.flags.is_castle()));
    }

    #[test]
    fn queenside_castling_allows_attacked_b_file() {
        // Only b1 is covered; the king never crosses it.
        let board = fen("1r5k/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(legal_moves(&board).iter().any(|m| m.flags.castle_queenside));
    }

    #[test]
    fn en_passant_is_generated_and_flagged() {
        let board = fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1");
        let ep = parse_move(&board, "d5e6").unwrap();
        assert!(ep.flags.en_passant && ep.flags.capture);
    }

    #[test]
    fn en_passant_exposing_king_is_illegal() {
        // Capturing would clear the fifth rank between the rook and the king.
        let board = fen("8/8/8/K2Pp2r/8/8/8/7k w - e6 0 1");
        assert!(matches!(parse_move(&board, "d5e6"), Err(ChessError::IllegalMove { .. })));
    }

    #[test]
    fn promotions_come_in_four_flavours() {
        let board = fen("7k/P7/8/8/8/8/8/K7 w - - 0 1");
        let promos: Vec<_> = legal_moves(&board)
            .into_iter()
            .filter(|m| m.from == sq("a7"))
            .filter_map(|m| m.promotion)
            .collect();
        assert_eq!(promos, PieceType::PROMOTIONS.to_vec());
        assert!(matches!(parse_move(&board, "a7a8"), Err(ChessError::IllegalMove { .. })));
        assert_eq!(parse_move(&board, "a7a8n").unwrap().promotion, Some(PieceType::Knight));
    }

    #[test]
    fn attack_detection_covers_each_piece() {
        let board = fen("4k3/8/8/3n4/8/8/8/4K3 w - - 0 1");
        assert!(is_square_attacked_by(&board, sq("e3"), Color::Black));
        assert!(is_square_attacked_by(&board, sq("c7"), Color::Black));
        assert!(!is_square_attacked_by(&board, sq("d4"), Color::Black));

        let board = fen("4k3/8/8/8/3p4/8/8/4K3 w - - 0 1");
        assert!(is_square_attacked_by(&board, sq("c3"), Color::Black));
        assert!(is_square_attacked_by(&board, sq("e3"), Color::Black));
        assert!(!is_square_attacked_by(&board, sq("d3"), Color::Black));
        assert!(!is_square_attacked_by(&board, sq("c5"), Color::Black));
    }

    #[test]
    fn parse_move_reports_format_and_legality() {
        let board = Board::new();
        assert!(matches!(parse_move(&board, "zz"), Err(ChessError::InvalidFormat { .. })));
        assert!(matches!(parse_move(&board, "e2e5"), Err(ChessError::IllegalMove { .. })));
        assert!(parse_move(&board, "e2e4").is_ok());
    }

    #[test]
    fn perft_start_position_shallow() {
        let board = Board::new();
        assert_eq!(perft(&board, 1), 20);
        assert_eq!(perft(&board, 2), 400);
    }
}
