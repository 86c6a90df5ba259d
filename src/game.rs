//! A single game session: one live board, an optional engine side and the
//! SAN record of the moves played so far.

use tracing::{info, warn};

use crate::board::Board;
use crate::engine::{best_move, SearchConfig, SearchResult, MAX_DEPTH};
use crate::error::{ChessError, ChessResult};
use crate::movegen::{legal_moves, parse_move};
use crate::moves::Move;
use crate::piece::Color;
use crate::san::{describe_move, MoveDescription};
use crate::square::Square;
use crate::status::{game_status, GameResult};

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    engine_side: Option<Color>,
    config: SearchConfig,
    san_history: Vec<String>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new(None, SearchConfig::default())
    }
}

impl Game {
    /// A fresh game from the standard start. `engine_side` is the colour the
    /// engine plays, or `None` for two humans.
    pub fn new(engine_side: Option<Color>, config: SearchConfig) -> Self {
        let depth = config.depth.clamp(1, MAX_DEPTH);
        Game {
            board: Board::new(),
            engine_side,
            config: SearchConfig::with_depth(depth),
            san_history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn engine_side(&self) -> Option<Color> {
        self.engine_side
    }

    pub fn set_engine_side(&mut self, side: Option<Color>) {
        self.engine_side = side;
    }

    pub fn depth(&self) -> u32 {
        self.config.depth
    }

    /// Set the engine's search depth, clamped to `1..=MAX_DEPTH`.
    pub fn set_depth(&mut self, depth: u32) {
        self.config.depth = depth.clamp(1, MAX_DEPTH);
    }

    /// Moves played so far, in SAN.
    pub fn san_history(&self) -> &[String] {
        &self.san_history
    }

    pub fn status(&self) -> GameResult {
        game_status(&self.board)
    }

    pub fn is_over(&self) -> bool {
        self.status().is_over()
    }

    /// `1-0`, `0-1`, `1/2-1/2`, or `*` while the game goes on.
    pub fn result_string(&self) -> &'static str {
        self.status().score_text()
    }

    pub fn is_engine_turn(&self) -> bool {
        self.engine_side == Some(self.board.side_to_move()) && !self.is_over()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board)
    }

    /// Legal moves starting on `from`.
    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        let mut moves = self.legal_moves();
        moves.retain(|m| m.from == from);
        moves
    }

    /// Back to the initial position, keeping the engine side and depth.
    pub fn restart(&mut self) {
        self.board = Board::new();
        self.san_history.clear();
        info!("game restarted");
    }

    /// Play a move given in coordinate notation for the side to move.
    ///
    /// The board is left unchanged when the text is malformed, the move is
    /// illegal or the game has already finished.
    pub fn submit(&mut self, text: &str) -> ChessResult<MoveDescription> {
        if self.is_over() {
            warn!(input = text, "move submitted after the game ended");
            return Err(ChessError::GameOver);
        }
        let mv = parse_move(&self.board, text).inspect_err(|err| {
            warn!(input = text, %err, "move rejected");
        })?;
        self.commit(&mv)
    }

    /// Let the engine choose and play a move for the side to move.
    pub fn play_engine_move(&mut self) -> ChessResult<(MoveDescription, SearchResult)> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let result = best_move(&self.board, self.config.depth)?;
        let desc = self.commit(&result.mv)?;
        Ok((desc, result))
    }

    /// The move the engine would play here, searched to `depth` plies (or the
    /// session depth). The board is not touched.
    pub fn hint(&self, depth: Option<u32>) -> ChessResult<SearchResult> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let depth = depth.unwrap_or(self.config.depth).clamp(1, MAX_DEPTH);
        best_move(&self.board, depth)
    }

    /// Take back the last move.
    pub fn undo(&mut self) -> ChessResult<Move> {
        let mv = self.board.undo()?;
        self.san_history.pop();
        info!(mv = %mv, "move taken back");
        Ok(mv)
    }

    fn commit(&mut self, mv: &Move) -> ChessResult<MoveDescription> {
        let desc = describe_move(&self.board, mv)?;
        self.board.apply(&desc.mv)?;
        let san = desc.to_string();
        info!(
            ply = self.san_history.len() + 1,
            san = %san,
            uci = %desc.mv,
            "move played"
        );
        self.san_history.push(san);

        let status = self.status();
        if status.is_over() {
            info!(result = status.score_text(), %status, "game over");
        }
        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, PieceType};
    use crate::status::DrawReason;

    fn two_player() -> Game {
        Game::new(None, SearchConfig::with_depth(2))
    }

    #[test]
    fn submit_records_san_and_switches_sides() {
        let mut game = two_player();
        let desc = game.submit("e2e4").unwrap();
        assert_eq!(desc.to_string(), "e4");
        game.submit("g8f6").unwrap();
        assert_eq!(game.san_history(), ["e4", "Nf6"]);
        assert_eq!(game.board().side_to_move(), Color::White);
        assert_eq!(game.result_string(), "*");
    }

    #[test]
    fn rejected_input_leaves_the_game_alone() {
        let mut game = two_player();
        let before = game.board().clone();
        assert!(matches!(game.submit("zz"), Err(ChessError::InvalidFormat { .. })));
        assert!(matches!(game.submit("e2e5"), Err(ChessError::IllegalMove { .. })));
        assert_eq!(game.board(), &before);
        assert!(game.san_history().is_empty());
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = two_player();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.submit(text).unwrap();
        }
        assert_eq!(game.status(), GameResult::BlackWins);
        assert!(game.is_over());
        assert_eq!(game.result_string(), "0-1");
        assert_eq!(game.san_history().last().map(String::as_str), Some("Qh4#"));
        assert_eq!(game.submit("a2a3"), Err(ChessError::GameOver));
        assert_eq!(game.play_engine_move().unwrap_err(), ChessError::GameOver);
        assert_eq!(game.hint(None).unwrap_err(), ChessError::GameOver);
    }

    #[test]
    fn engine_answers_for_its_side() {
        let mut game = Game::new(Some(Color::Black), SearchConfig::with_depth(1));
        assert!(!game.is_engine_turn());
        game.submit("e2e4").unwrap();
        assert!(game.is_engine_turn());
        let (desc, result) = game.play_engine_move().unwrap();
        assert_eq!(desc.mv, result.mv);
        assert_eq!(game.board().side_to_move(), Color::White);
        assert_eq!(game.san_history().len(), 2);
    }

    #[test]
    fn hint_does_not_move() {
        let game = two_player();
        let before = game.board().clone();
        let hint = game.hint(Some(1)).unwrap();
        assert!(game.legal_moves().contains(&hint.mv));
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn undo_and_restart() {
        let mut game = two_player();
        assert_eq!(game.undo(), Err(ChessError::NothingToUndo));
        game.submit("e2e4").unwrap();
        game.submit("e7e5").unwrap();
        let taken = game.undo().unwrap();
        assert_eq!(taken.to_uci(), "e7e5");
        assert_eq!(game.san_history(), ["e4"]);

        game.restart();
        assert_eq!(game.board(), &Board::new());
        assert!(game.san_history().is_empty());
    }

    #[test]
    fn depth_is_clamped() {
        let mut game = Game::new(None, SearchConfig::with_depth(0));
        assert_eq!(game.depth(), 1);
        game.set_depth(50);
        assert_eq!(game.depth(), MAX_DEPTH);
        game.set_depth(3);
        assert_eq!(game.depth(), 3);
    }

    #[test]
    fn moves_from_a_square() {
        let game = two_player();
        let knight = Square::parse("g1").unwrap();
        assert_eq!(game.board().piece_at(knight), Some(Piece::new(PieceType::Knight, Color::White)));
        let targets: Vec<String> = game.legal_moves_from(knight).iter().map(|m| m.to.to_string()).collect();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&"f3".to_string()) && targets.contains(&"h3".to_string()));
    }

    #[test]
    fn repetition_is_reported_as_a_draw() {
        let mut game = two_player();
        for _ in 0..2 {
            for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                game.submit(text).unwrap();
            }
        }
        assert_eq!(game.status(), GameResult::Draw(DrawReason::ThreefoldRepetition));
        assert_eq!(game.result_string(), "1/2-1/2");
    }
}
