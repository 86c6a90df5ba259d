// =============================================================================
// Search engine
//
// Depth-limited minimax with alpha-beta pruning. White maximizes, Black
// minimizes; all scores are from White's point of view (see eval.rs).
// Moves are ordered at every node by capture value, check and promotion so
// that alpha-beta prunes early. The root scores every legal move with the
// full window and keeps the first best one in ordering order, so a given
// board and depth always produce the same move.
//
// The caller's board is never touched: the search plays moves on its own
// copy with make/unmake.
// =============================================================================

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, trace};

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::eval::{material, terminal_score};
use crate::movegen::{has_legal_move_in_place, is_in_check, legal_moves_in_place};
use crate::moves::Move;
use crate::piece::{Color, PieceType};

// =============================================================================
// Configuration
// =============================================================================

/// Depth the engine plays at unless told otherwise.
pub const DEFAULT_DEPTH: u32 = 5;

/// Deepest search a game session will accept.
pub const MAX_DEPTH: u32 = 8;

/// Added to the priority of a move that gives check.
const CHECK_BONUS: i32 = 50_000;

/// Added to the priority of a promotion; above any capture.
const PROMOTION_BONUS: i32 = 100_000_000;

/// Wider than any reachable score.
const INFINITY: i32 = i32::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies to search below the root, at least 1.
    pub depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        SearchConfig { depth: DEFAULT_DEPTH }
    }

    pub fn with_depth(depth: u32) -> Self {
        SearchConfig { depth }
    }
}

/// The move chosen by a search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub mv: Move,
    /// Minimax value of `mv` from White's point of view.
    pub score: i32,
    /// Positions visited, root children included.
    pub nodes: u64,
    /// False when cancellation stopped the search before every root move
    /// was scored.
    pub complete: bool,
}

// =============================================================================
// Move ordering
// =============================================================================

/// Ordering priority of `mv` on `board`; higher is searched first.
///
/// Captures score `victim × 10000 − attacker`, so pawn takes queen comes
/// before queen takes queen. Checks get a fixed bonus and promotions a bonus
/// larger than any capture.
pub fn move_priority(board: &Board, mv: &Move) -> i32 {
    let mut scratch = board.clone();
    priority_in_place(&mut scratch, mv)
}

fn priority_in_place(board: &mut Board, mv: &Move) -> i32 {
    let mut score = 0;

    if mv.flags.capture {
        let victim = if mv.flags.en_passant {
            PieceType::Pawn.value()
        } else {
            board.piece_at(mv.to).map_or(0, |p| p.piece_type.value())
        };
        let attacker = board.piece_at(mv.from).map_or(0, |p| p.piece_type.value());
        score += victim * 10_000 - attacker;
    }

    if let Some(promo) = mv.promotion {
        score += PROMOTION_BONUS + promo.value();
    }

    let them = board.side_to_move().opposite();
    board.make_move(mv);
    if is_in_check(board, them) {
        score += CHECK_BONUS;
    }
    board.unmake_move();

    score
}

/// Sort moves so the most promising are searched first. The sort is stable:
/// equal priorities keep generation order.
pub fn order_moves(board: &Board, moves: &mut [Move]) {
    let mut scratch = board.clone();
    order_moves_in_place(&mut scratch, moves);
}

fn order_moves_in_place(board: &mut Board, moves: &mut [Move]) {
    let mut keyed: Vec<(i32, Move)> = moves
        .iter()
        .map(|mv| (priority_in_place(board, mv), *mv))
        .collect();
    keyed.sort_by_key(|&(priority, _)| Reverse(priority));
    for (slot, (_, mv)) in moves.iter_mut().zip(keyed) {
        *slot = mv;
    }
}

// =============================================================================
// Search
// =============================================================================

/// One search run. Holds node statistics and an optional cancellation flag
/// polled at every node.
pub struct Searcher<'a> {
    cancel: Option<&'a AtomicBool>,
    nodes: u64,
    cutoffs: u64,
}

impl Default for Searcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Searcher<'a> {
    pub fn new() -> Self {
        Searcher { cancel: None, nodes: 0, cutoffs: 0 }
    }

    /// Stop early once `flag` is set. The result then holds the best root
    /// move that finished searching.
    pub fn with_cancel(flag: &'a AtomicBool) -> Self {
        Searcher { cancel: Some(flag), nodes: 0, cutoffs: 0 }
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Find the best move for the side to move, searching `depth` plies.
    pub fn search(&mut self, board: &Board, depth: u32) -> ChessResult<SearchResult> {
        if depth == 0 {
            return Err(ChessError::InvalidDepth { depth });
        }

        let mut work = board.clone();
        let mut moves = legal_moves_in_place(&mut work);
        if moves.is_empty() {
            return Err(ChessError::NoLegalMoves);
        }
        order_moves_in_place(&mut work, &mut moves);

        let maximizing = work.side_to_move() == Color::White;
        let mut best: Option<(Move, i32)> = None;
        let mut complete = true;

        for mv in &moves {
            if self.cancelled() {
                complete = false;
                break;
            }
            work.make_move(mv);
            let score = self.alpha_beta(&mut work, depth - 1, 1, -INFINITY, INFINITY);
            work.unmake_move();
            // A move interrupted halfway has no trustworthy score.
            if self.cancelled() {
                complete = false;
                break;
            }
            trace!(mv = %mv, score, "root move scored");

            let improves = match best {
                None => true,
                Some((_, best_score)) if maximizing => score > best_score,
                Some((_, best_score)) => score < best_score,
            };
            if improves {
                best = Some((*mv, score));
            }
        }

        let (mv, score) = best.ok_or(ChessError::SearchCancelled)?;
        debug!(
            depth,
            nodes = self.nodes,
            cutoffs = self.cutoffs,
            score,
            best = %mv,
            complete,
            "search finished"
        );
        Ok(SearchResult { mv, score, nodes: self.nodes, complete })
    }

    /// Minimax value of `board` within the window [alpha, beta].
    fn alpha_beta(&mut self, board: &mut Board, depth: u32, ply: u32, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;

        if depth == 0 || self.cancelled() {
            let no_moves = !has_legal_move_in_place(board);
            return terminal_score(board, no_moves, ply).unwrap_or_else(|| material(board));
        }

        let mut moves = legal_moves_in_place(board);
        if let Some(score) = terminal_score(board, moves.is_empty(), ply) {
            return score;
        }
        order_moves_in_place(board, &mut moves);

        if board.side_to_move() == Color::White {
            let mut best = -INFINITY;
            for mv in &moves {
                board.make_move(mv);
                let score = self.alpha_beta(board, depth - 1, ply + 1, alpha, beta);
                board.unmake_move();
                best = best.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    self.cutoffs += 1;
                    break;
                }
            }
            best
        } else {
            let mut best = INFINITY;
            for mv in &moves {
                board.make_move(mv);
                let score = self.alpha_beta(board, depth - 1, ply + 1, alpha, beta);
                board.unmake_move();
                best = best.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    self.cutoffs += 1;
                    break;
                }
            }
            best
        }
    }
}

/// Search `board` to `depth` plies and return the chosen move and its score.
///
/// Fails with `NoLegalMoves` on a finished game and `InvalidDepth` for a
/// depth of 0.
pub fn best_move(board: &Board, depth: u32) -> ChessResult<SearchResult> {
    Searcher::new().search(board, depth)
}
