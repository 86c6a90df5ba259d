//! Chess rules and a small alpha-beta engine.
//!
//! The six functions at the crate root are everything a front end needs to
//! run a game: start a board, list and parse moves, play them, ask whether
//! the game is over and ask the engine for a reply. [`game::Game`] wraps
//! them into a session handle.
//!
//! ```
//! let board = gambit::new_game();
//! let mv = gambit::parse_move(&board, "e2e4").unwrap();
//! let board = gambit::apply(&board, &mv).unwrap();
//! assert_eq!(gambit::legal_moves(&board).len(), 20);
//! assert_eq!(gambit::game_status(&board), gambit::GameResult::Ongoing);
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod san;
pub mod square;
pub mod status;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::{Board, CastlingRights};
pub use engine::{best_move, SearchConfig, SearchResult, Searcher};
pub use error::{ChessError, ChessResult};
pub use eval::evaluate;
pub use game::Game;
pub use movegen::{legal_moves, parse_move};
pub use moves::{Move, MoveFlags};
pub use piece::{Color, Piece, PieceType};
pub use san::{describe_move, MoveDescription};
pub use square::Square;
pub use status::{game_status, DrawReason, GameResult};

/// The standard initial position, White to move.
pub fn new_game() -> Board {
    Board::new()
}

/// Play `mv` on a copy of `board` and return the copy.
///
/// Fails with `IllegalMove` if `mv` is not legal here; `board` itself is
/// never modified.
pub fn apply(board: &Board, mv: &Move) -> ChessResult<Board> {
    let mut next = board.clone();
    next.apply(mv)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_returns_a_new_board() {
        let board = new_game();
        let mv = parse_move(&board, "e2e4").unwrap();
        let next = apply(&board, &mv).unwrap();
        assert_eq!(board, new_game());
        assert_eq!(next.side_to_move(), Color::Black);
        assert_eq!(next.en_passant_target(), Square::parse("e3"));
    }

    #[test]
    fn apply_rejects_a_move_from_another_position() {
        let board = new_game();
        let after = apply(&board, &parse_move(&board, "e2e4").unwrap()).unwrap();
        let stale = parse_move(&board, "d2d4").unwrap();
        let replay = parse_move(&board, "e2e4").unwrap();
        assert!(apply(&after, &stale).is_err());
        assert!(matches!(apply(&after, &replay), Err(ChessError::IllegalMove { .. })));
    }
}
