use clap::Parser;
use gambit::engine::SearchConfig;
use gambit::game::Game;
use gambit::status::GameResult;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "selfplay", about = "Let the engine play itself")]
struct Args {
    /// Search depth in plies for both sides
    #[arg(short, long, default_value_t = 2)]
    depth: u32,

    /// Number of games to play
    #[arg(short, long, default_value_t = 1)]
    games: usize,

    /// Random legal moves played before the engine takes over, so games differ
    #[arg(long, default_value_t = 0)]
    random_plies: usize,

    /// Seed for the random opening moves
    #[arg(long)]
    seed: Option<u64>,

    /// Stop a game after this many plies and score it as unfinished
    #[arg(long, default_value_t = 300)]
    max_plies: usize,

    /// Print one JSON record per game instead of a summary line
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GameRecord {
    game: usize,
    seed: u64,
    depth: u32,
    plies: usize,
    result: &'static str,
    status: GameResult,
    moves: Vec<String>,
    nodes: u64,
}

fn play_game(args: &Args, index: usize, rng: &mut StdRng, seed: u64) -> GameRecord {
    let mut game = Game::new(None, SearchConfig::with_depth(args.depth));
    let mut nodes = 0;

    while !game.is_over() && game.san_history().len() < args.max_plies {
        if game.san_history().len() < args.random_plies {
            let moves = game.legal_moves();
            let Some(mv) = moves.choose(rng) else { break };
            if game.submit(&mv.to_uci()).is_err() {
                break;
            }
            continue;
        }
        match game.play_engine_move() {
            Ok((_, result)) => nodes += result.nodes,
            Err(_) => break,
        }
    }

    GameRecord {
        game: index,
        seed,
        depth: game.depth(),
        plies: game.san_history().len(),
        result: game.result_string(),
        status: game.status(),
        moves: game.san_history().to_vec(),
        nodes,
    }
}

fn main() -> Result<(), serde_json::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    info!(seed, depth = args.depth, games = args.games, "starting self-play");

    let (mut white, mut black, mut drawn, mut unfinished) = (0, 0, 0, 0);
    for index in 1..=args.games {
        let record = play_game(&args, index, &mut rng, seed);
        match record.status {
            GameResult::WhiteWins => white += 1,
            GameResult::BlackWins => black += 1,
            GameResult::Draw(_) => drawn += 1,
            GameResult::Ongoing => unfinished += 1,
        }
        if args.json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            eprintln!(
                "Game {index}: {} after {} plies ({}, {} nodes)",
                record.result, record.plies, record.status, record.nodes
            );
        }
    }

    if !args.json {
        eprintln!("White {white}, Black {black}, drawn {drawn}, unfinished {unfinished} (seed {seed})");
    }
    Ok(())
}
