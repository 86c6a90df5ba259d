use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};
use gambit::board::Board;
use gambit::engine::{SearchConfig, DEFAULT_DEPTH};
use gambit::game::Game;
use gambit::piece::Color;
use gambit::square::Square;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
    None,
}

#[derive(Parser)]
#[command(name = "play", about = "Play chess against the engine in the terminal")]
struct Args {
    /// Search depth in plies
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Side the engine plays
    #[arg(short, long, value_enum, default_value = "black")]
    engine: Side,
}

fn render(board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..8u8).rev() {
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..8u8 {
            let c = Square::new(file, rank)
                .and_then(|sq| board.piece_at(sq))
                .map_or('.', |p| p.fen_char());
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h\n");
    out
}

const HELP: &str = "moves: e2e4, e7e8q | commands: hint, undo, moves, restart, quit";

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let engine_side = match args.engine {
        Side::White => Some(Color::White),
        Side::Black => Some(Color::Black),
        Side::None => None,
    };
    let mut game = Game::new(engine_side, SearchConfig::with_depth(args.depth));
    println!("{HELP}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if game.is_engine_turn() {
            match game.play_engine_move() {
                Ok((desc, result)) => {
                    println!("engine plays {desc} ({} nodes, score {})", result.nodes, result.score)
                }
                Err(err) => println!("engine failed: {err}"),
            }
            continue;
        }

        println!("\n{}", render(game.board()));
        if game.is_over() {
            println!("{} ({})", game.status(), game.result_string());
            println!("type restart to play again, or quit");
        } else {
            let check = if game.board().in_check() { ", in check" } else { "" };
            println!("{} to move{check}", game.board().side_to_move());
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "restart" => game.restart(),
            "undo" => {
                // Take back the engine's reply as well so the human is to move again.
                let steps = if engine_side.is_some() && game.san_history().len() >= 2 { 2 } else { 1 };
                for _ in 0..steps {
                    if let Err(err) = game.undo() {
                        println!("{err}");
                        break;
                    }
                }
            }
            "hint" => match game.hint(None) {
                Ok(result) => println!("hint: {}", result.mv),
                Err(err) => println!("{err}"),
            },
            "moves" => {
                let moves: Vec<String> = game.legal_moves().iter().map(|m| m.to_uci()).collect();
                println!("{}", moves.join(" "));
            }
            text => match game.submit(text) {
                Ok(desc) => println!("you play {desc}"),
                Err(err) => println!("{err}"),
            },
        }
    }

    if !game.san_history().is_empty() {
        println!("{} {}", game.san_history().join(" "), game.result_string());
    }
    Ok(())
}
