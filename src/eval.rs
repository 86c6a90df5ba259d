//! Static position evaluation. Scores are in centipawns from White's point
//! of view: positive favours White.

use crate::board::Board;
use crate::movegen;
use crate::piece::Color;
use crate::status::{status_with, GameResult};

/// Score of a checkmate. Far above any material total, so a mate always
/// outranks winning material.
pub const MATE_SCORE: i32 = 1_000_000;

/// Evaluate `board`: mates score `±MATE_SCORE` in favour of the side that
/// delivered them, draws score 0, anything else is the material balance.
pub fn evaluate(board: &Board) -> i32 {
    let no_moves = !movegen::has_legal_move(board);
    terminal_score(board, no_moves, 0).unwrap_or_else(|| material(board))
}

/// Score of a finished game, or `None` while it is still going. Mates found
/// `ply` half-moves below the root lose a point per ply so nearer mates win.
pub(crate) fn terminal_score(board: &Board, no_moves: bool, ply: u32) -> Option<i32> {
    match status_with(board, no_moves) {
        GameResult::WhiteWins => Some(MATE_SCORE - ply as i32),
        GameResult::BlackWins => Some(-(MATE_SCORE - ply as i32)),
        GameResult::Draw(_) => Some(0),
        GameResult::Ongoing => None,
    }
}

/// Material sum, White minus Black.
pub fn material(board: &Board) -> i32 {
    board
        .pieces()
        .map(|(_, p)| match p.color {
            Color::White => p.piece_type.value(),
            Color::Black => -p.piece_type.value(),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fen(s: &str) -> Board {
        Board::from_fen(s).expect("valid FEN")
    }

    #[test]
    fn start_position_is_level() {
        assert_eq!(evaluate(&Board::new()), 0);
    }

    #[test]
    fn material_counts_pieces() {
        let board = fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1");
        assert_eq!(material(&board), 900);
        assert_eq!(evaluate(&board), 900);

        let board = fen("r3k3/pp6/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(evaluate(&board), -700);
    }

    #[test]
    fn mate_favours_side_not_to_move() {
        let mated_black = fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(evaluate(&mated_black), MATE_SCORE);

        let mated_white = fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(evaluate(&mated_white), -MATE_SCORE);
    }

    #[test]
    fn draws_score_zero_even_when_material_is_uneven() {
        let stalemate = fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_ne!(material(&stalemate), 0);
        assert_eq!(evaluate(&stalemate), 0);

        let lone_knight = fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1");
        assert_eq!(evaluate(&lone_knight), 0);
    }
}
