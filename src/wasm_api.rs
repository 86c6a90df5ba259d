use crate::board::Board;
use crate::engine::{SearchConfig, SearchResult};
use crate::game::Game;
use crate::piece::{Color, PieceType};
use crate::square::Square;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct MoveJson {
    from: String,
    to: String,
    uci: String,
    promotion: Option<String>,
}

#[derive(Serialize)]
struct BoardState {
    /// Indexed `[rank][file]`, rank 0 being White's back rank.
    squares: Vec<Vec<Option<SquarePiece>>>,
    fen: String,
    current_turn: String,
    game_over: bool,
    status: String,
    result: String,
    is_in_check: bool,
    legal_moves: Vec<MoveJson>,
    history: Vec<String>,
    last_move: Option<String>,
    engine_side: Option<String>,
    depth: u32,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

#[derive(Serialize)]
struct HintJson {
    #[serde(flatten)]
    mv: MoveJson,
    score: i32,
    nodes: u64,
}

fn piece_type_to_string(pt: PieceType) -> String {
    match pt {
        PieceType::King => "King".to_string(),
        PieceType::Queen => "Queen".to_string(),
        PieceType::Rook => "Rook".to_string(),
        PieceType::Bishop => "Bishop".to_string(),
        PieceType::Knight => "Knight".to_string(),
        PieceType::Pawn => "Pawn".to_string(),
    }
}

fn color_to_string(c: Color) -> String {
    c.to_string()
}

fn string_to_color(s: &str) -> Option<Color> {
    match s {
        "White" | "white" | "w" => Some(Color::White),
        "Black" | "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

fn move_json(mv: &crate::moves::Move) -> MoveJson {
    MoveJson {
        from: mv.from.to_string(),
        to: mv.to.to_string(),
        uci: mv.to_uci(),
        promotion: mv.promotion.map(piece_type_to_string),
    }
}

fn build_board_state(game: &Game) -> BoardState {
    let board: &Board = game.board();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8u8)
        .map(|rank| {
            (0..8u8)
                .map(|file| {
                    Square::new(file, rank).and_then(|sq| board.piece_at(sq)).map(|p| SquarePiece {
                        piece_type: piece_type_to_string(p.piece_type),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();

    let status = game.status();
    BoardState {
        squares,
        fen: board.to_fen(),
        current_turn: color_to_string(board.side_to_move()),
        game_over: status.is_over(),
        status: status.to_string(),
        result: status.score_text().to_string(),
        is_in_check: board.in_check(),
        legal_moves: game.legal_moves().iter().map(move_json).collect(),
        history: game.san_history().to_vec(),
        last_move: board.last_move().map(|m| m.to_uci()),
        engine_side: game.engine_side().map(color_to_string),
        depth: game.depth(),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn state_or_error<T>(game: &Game, outcome: crate::error::ChessResult<T>) -> JsValue {
    let result = match outcome {
        Ok(_) => MoveResult { board_state: Some(build_board_state(game)), error: None },
        Err(err) => MoveResult { board_state: None, error: Some(err.to_string()) },
    };
    to_js(&result)
}

#[wasm_bindgen(js_name = Game)]
pub struct WasmGame {
    game: Game,
    last_nodes: u64,
}

#[wasm_bindgen(js_class = Game)]
impl WasmGame {
    /// `engine_side` is "white", "black" or absent for two human players.
    #[wasm_bindgen(constructor)]
    pub fn new(engine_side: Option<String>) -> WasmGame {
        let side = engine_side.as_deref().and_then(string_to_color);
        WasmGame {
            game: Game::new(side, SearchConfig::default()),
            last_nodes: 0,
        }
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.game.set_depth(depth);
    }

    pub fn set_engine_side(&mut self, engine_side: Option<String>) {
        self.game.set_engine_side(engine_side.as_deref().and_then(string_to_color));
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.game))
    }

    /// Play a move in coordinate notation such as "e2e4" or "e7e8q".
    pub fn make_move(&mut self, text: &str) -> JsValue {
        let outcome = self.game.submit(text);
        state_or_error(&self.game, outcome)
    }

    pub fn make_ai_move(&mut self) -> JsValue {
        let outcome = self.game.play_engine_move();
        if let Ok((_, result)) = &outcome {
            self.last_nodes = result.nodes;
        }
        state_or_error(&self.game, outcome)
    }

    pub fn undo(&mut self) -> JsValue {
        let outcome = self.game.undo();
        state_or_error(&self.game, outcome)
    }

    pub fn restart(&mut self) -> JsValue {
        self.game.restart();
        self.last_nodes = 0;
        to_js(&build_board_state(&self.game))
    }

    pub fn get_hint(&self, depth: Option<u32>) -> JsValue {
        match self.game.hint(depth) {
            Ok(SearchResult { mv, score, nodes, .. }) => to_js(&HintJson { mv: move_json(&mv), score, nodes }),
            Err(_) => JsValue::NULL,
        }
    }

    /// Legal moves from an algebraic square such as "g1".
    pub fn get_legal_moves_for_square(&self, square: &str) -> JsValue {
        let moves: Vec<MoveJson> = Square::parse(square)
            .map(|sq| self.game.legal_moves_from(sq).iter().map(move_json).collect())
            .unwrap_or_default();
        to_js(&moves)
    }

    pub fn get_last_nodes(&self) -> u64 {
        self.last_nodes
    }
}
