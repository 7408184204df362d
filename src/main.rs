use std::process::ExitCode;

use grandmastery::config::EngineConfig;
use grandmastery::engine::{movegen, notation, pgn, GameSession};

const USAGE: &str = "\
usage:
  grandmastery perft <depth> [fen]   count leaf nodes of the legal move tree
  grandmastery play <moves> [fen]    replay a comma-separated move list
  grandmastery --help                show this message

environment:
  CHESS_START_FEN            default starting position
  CHESS_VARIANT              classic (default) or fischer / chess960
  CHESS_CLOCK_INITIAL_MS     per-side time budget (0 = untimed)
  CHESS_CLOCK_INCREMENT_MS   increment per move
  RUST_LOG                   log filter (default grandmastery=info)";

fn main() -> ExitCode {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grandmastery=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let outcome = match args.first().map(String::as_str) {
        Some("perft") => run_perft(&args[1..], &config),
        Some("play") => run_play(&args[1..], &config),
        Some("--help") | Some("-h") | None => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => Err(format!("unknown command '{other}'\n\n{USAGE}")),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Starting position: explicit argument, then config, then the standard one.
fn starting_fen<'a>(arg: Option<&'a String>, config: &'a EngineConfig) -> Option<&'a str> {
    arg.map(String::as_str).or(config.start_fen.as_deref())
}

fn run_perft(args: &[String], config: &EngineConfig) -> Result<(), String> {
    let depth: u32 = args
        .first()
        .ok_or("perft needs a depth")?
        .parse()
        .map_err(|e| format!("invalid depth: {e}"))?;
    let fen = starting_fen(args.get(1), config).unwrap_or(notation::STARTING_FEN);
    let state = notation::decode(fen).map_err(|e| e.to_string())?;

    tracing::info!(depth, fen, "running perft");
    let start = std::time::Instant::now();
    let mut total = 0u64;
    for (mv, nodes) in movegen::perft_divide(&state, depth) {
        println!("{mv}: {nodes}");
        total += nodes;
    }
    if depth == 0 {
        total = 1;
    }
    println!("\nnodes: {total}");
    tracing::info!(nodes = total, elapsed_ms = start.elapsed().as_millis() as u64, "perft done");
    Ok(())
}

fn run_play(args: &[String], config: &EngineConfig) -> Result<(), String> {
    let moves = args.first().ok_or("play needs a move list")?;
    let fen = starting_fen(args.get(1), config);
    let mut session = match fen {
        None if config.fischer => GameSession::fischer(&mut rand::thread_rng()),
        _ => GameSession::create(fen).map_err(|e| e.to_string())?,
    };
    if let Some(clock) = config.clock() {
        session = session.with_clock(clock);
    }

    let replay = session.play_moves(moves);

    println!("{}\n", session.state().board.render());
    println!("notation: {}", session.export_notation());
    println!("result:   {}", session.result());
    println!("\n{}", pgn::to_pgn(&session));

    replay.map(|_| ()).map_err(|e| e.to_string())
}
