//! Error types for the chess core.
//!
//! Input errors (`InvalidFormat`, `IllegalMove`, `GameOver`) are recoverable and
//! never leave a board partially modified. `NoLegalMoves` and `InvalidDepth`
//! are caller errors: check `game_status` and the depth before searching.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// Move text does not match `<file><rank><file><rank>[q|r|b|n]`.
    #[error("invalid move format: {text:?} (expected coordinates like e2e4 or e7e8q)")]
    InvalidFormat { text: String },

    /// Well-formed move text that is not legal in the current position.
    #[error("illegal move: {text}")]
    IllegalMove { text: String },

    /// The search was asked for a move in a position with none.
    #[error("no legal moves in this position")]
    NoLegalMoves,

    #[error("search depth must be at least 1, got {depth}")]
    InvalidDepth { depth: u32 },

    /// Cancelled before any root move finished searching.
    #[error("search cancelled before a move was found")]
    SearchCancelled,

    #[error("invalid FEN: {reason}")]
    InvalidFen { reason: String },

    /// A well-formed setup that breaks a board invariant.
    #[error("invalid position: {reason}")]
    InvalidPosition { reason: String },

    #[error("no move to undo")]
    NothingToUndo,

    #[error("the game is already over")]
    GameOver,
}

pub type ChessResult<T> = Result<T, ChessError>;
