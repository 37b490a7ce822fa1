//! Engine evaluation from the command line

use chess_explorer_core::engine::{find_stockfish, Evaluator, SearchLimit};
use chess_explorer_core::{AnalysisConfig, AnalysisSession, Settings, StockfishEngine};
use std::env;
use std::process;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    println!("Chess Explorer");
    println!("==================");
    println!();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let settings = Settings::from_env();
    let engine_path = settings.stockfish_path.clone().unwrap_or_else(find_stockfish);
    let (positional, limit, lines) = split_limit(&args[2..]);

    match args[1].as_str() {
        "analyze" => {
            let fen = positional.first().map(String::as_str).unwrap_or(START_FEN);
            analyze(&engine_path, fen, limit, lines);
        }
        "eval" => {
            let Some(fen) = positional.first() else {
                println!("Error: Please provide a FEN string");
                println!("Usage: {} eval \"<fen>\"", args[0]);
                process::exit(1);
            };
            eval_position(&engine_path, fen, limit);
        }
        "best" => {
            let fen = positional.first().map(String::as_str).unwrap_or(START_FEN);
            let mut evaluator = start_evaluator(&engine_path);
            match evaluator.find_best_move(fen, limit) {
                Ok(Some(mv)) => println!("Best move: {}", mv),
                Ok(None) => println!("No legal moves"),
                Err(e) => {
                    println!("[ERROR] {}", e);
                    process::exit(1);
                }
            }
        }
        "compare" => {
            if positional.len() < 2 {
                println!("Error: Please provide a FEN string and candidate moves");
                println!("Usage: {} compare \"<fen>\" <uci> [<uci> ...]", args[0]);
                process::exit(1);
            }
            compare(&engine_path, &positional[0], &positional[1..], limit);
        }
        "sequence" => {
            sequence(&engine_path, &positional, limit);
        }
        "test-engine" => {
            test_engine(&engine_path);
        }
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

/// Pulls `--depth N`, `--movetime MS` and `--lines N` out of the argument list
fn split_limit(args: &[String]) -> (Vec<String>, Option<SearchLimit>, Option<u32>) {
    let mut positional = Vec::new();
    let mut limit = None;
    let mut lines = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--depth" => limit = iter.next().and_then(|v| v.parse().ok()).map(SearchLimit::Depth),
            "--movetime" => limit = iter.next().and_then(|v| v.parse().ok()).map(SearchLimit::MoveTime),
            "--lines" => lines = iter.next().and_then(|v| v.parse().ok()),
            _ => positional.push(arg.clone()),
        }
    }

    (positional, limit, lines)
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [arguments] [--depth N | --movetime MS] [--lines N]", program);
    println!();
    println!("Commands:");
    println!("  analyze [\"<fen>\"]            Live analysis with the best-line table");
    println!("  eval \"<fen>\"                 Evaluate a position");
    println!("  best [\"<fen>\"]               Print the best move only");
    println!("  compare \"<fen>\" <uci>...     Compare candidate moves");
    println!("  sequence <uci>...            Evaluate every position of a move sequence");
    println!("  test-engine                  Test Stockfish connection");
    println!();
    println!("Examples:");
    println!("  {} eval \"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\"", program);
    println!("  {} compare \"{}\" e2e4 d2d4 g1f3 c2c4 --depth 12", program, START_FEN);
    println!();
    println!("Set STOCKFISH_PATH to use a specific engine binary.");
}

fn start_engine(path: &str) -> StockfishEngine {
    match StockfishEngine::new(path) {
        Ok(engine) => engine,
        Err(e) => {
            println!("[ERROR] Failed to start Stockfish: {}", e);
            println!();
            println!("Make sure Stockfish is installed:");
            println!("  sudo apt install stockfish");
            process::exit(1);
        }
    }
}

fn start_evaluator(path: &str) -> Evaluator {
    Evaluator::new(start_engine(path), AnalysisConfig::default())
}

fn analyze(path: &str, fen: &str, limit: Option<SearchLimit>, lines: Option<u32>) {
    let config = AnalysisConfig::default();
    let mut engine = start_engine(path);
    if let Some(n) = lines {
        if let Err(e) = engine.set_option("MultiPV", &n.to_string()) {
            println!("[WARN] Could not set MultiPV: {}", e);
        }
    }
    let mut session = AnalysisSession::new(config);
    let limit = limit.unwrap_or(SearchLimit::Depth(config.default_depth));

    println!("Analyzing: {}", fen);
    println!();

    let result = engine.analyze(&mut session, fen, limit, |line| {
        println!("   depth {:>2}  {:>7}  {}", line.depth, line.evaluation_text(), line.moves_text());
    });

    match result {
        Ok(best) => {
            println!("----------------------------------------");
            println!("   Best move: {}", best.best);
            if let Some(current) = session.current_evaluation() {
                println!("   Evaluation: {} (depth {})", current.score, current.depth);
            }
            println!("   Best lines:");
            for (i, line) in session.best_lines().iter().enumerate() {
                println!("   {}. [{}] {}", i + 1, line.evaluation_text(), line.moves_text());
            }
            println!("----------------------------------------");
        }
        Err(e) => {
            println!("[ERROR] Analysis failed: {}", e);
            process::exit(1);
        }
    }
}

fn eval_position(path: &str, fen: &str, limit: Option<SearchLimit>) {
    println!("Evaluating position...");
    println!("   FEN: {}", fen);
    println!();

    let mut evaluator = start_evaluator(path);

    match evaluator.evaluate_position(fen, limit) {
        Ok(eval) => {
            println!("----------------------------------------");
            println!("   Evaluation: {}", eval.text);
            if let Some(score) = eval.score {
                println!("   Score: {}", score);
            }
            println!("   Best move: {}", eval.best_move.as_deref().unwrap_or("-"));
            println!("   Depth: {}", eval.depth);
            println!("   Best line: {}", eval.pv_san.join(" "));
            println!("----------------------------------------");
        }
        Err(e) => {
            println!("[ERROR] Analysis failed: {}", e);
            process::exit(1);
        }
    }
}

fn compare(path: &str, fen: &str, moves: &[String], limit: Option<SearchLimit>) {
    let mut evaluator = start_evaluator(path);

    let results = match evaluator.compare_moves(fen, moves, limit) {
        Ok(r) => r,
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    println!("Candidate moves (white's point of view):");
    for result in &results {
        match &result.evaluation {
            Some(eval) => match eval.score {
                Some(score) => println!("   {:6} {:>7}  {}", result.mv, score.to_string(), eval.text),
                None => println!("   {:6} {}", result.mv, eval.text),
            },
            None => println!("   {:6} Illegal move", result.mv),
        }
    }
}

fn sequence(path: &str, args: &[String], limit: Option<SearchLimit>) {
    let (start_fen, moves) = match args.first() {
        Some(first) if first.contains('/') => (Some(first.as_str()), &args[1..]),
        _ => (None, args),
    };

    let mut evaluator = start_evaluator(path);

    match evaluator.evaluate_sequence(moves, start_fen, limit) {
        Ok(evaluations) => {
            for (ply, eval) in evaluations.iter().enumerate() {
                let label = if ply == 0 {
                    "start".to_string()
                } else {
                    moves[ply - 1].clone()
                };
                let score = eval.score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
                println!("   {:>3}. {:6} {:>7}", ply, label, score);
            }
        }
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    }
}

fn test_engine(path: &str) {
    println!("Testing Stockfish connection ({})...", path);
    println!();

    let mut evaluator = start_evaluator(path);
    let name = evaluator.engine_mut().name().unwrap_or("unknown engine").to_string();
    println!("[OK] {} started successfully!", name);
    println!();

    println!("Analyzing starting position (depth 12)...");
    match evaluator.evaluate_position(START_FEN, Some(SearchLimit::Depth(12))) {
        Ok(eval) => {
            println!("   Best move: {}", eval.best_move.as_deref().unwrap_or("-"));
            println!("   Evaluation: {}", eval.text);
            println!("   PV: {}", eval.pv_san.iter().take(5).cloned().collect::<Vec<_>>().join(" "));
        }
        Err(e) => println!("[ERROR] Analysis failed: {}", e),
    }

    println!();
    println!("Analyzing tactical position...");
    let tactical_fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    match evaluator.evaluate_position(tactical_fen, Some(SearchLimit::Depth(15))) {
        Ok(eval) => {
            println!("   Position: Scholar's Mate threat");
            println!("   Best move: {} (should be h5f7)", eval.best_move.as_deref().unwrap_or("-"));
            println!("   Evaluation: {}", eval.text);
        }
        Err(e) => println!("[ERROR] Analysis failed: {}", e),
    }

    println!();
    println!("[OK] Engine test complete!");
}
