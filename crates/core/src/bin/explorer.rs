//! Opening statistics from the Lichess explorer

use chess_explorer_core::lichess::{ExplorerParams, ExplorerResponse, PlayerParams, Side, Speed};
use chess_explorer_core::{ExplorerClient, Settings};
use std::env;
use std::process;

#[derive(Default)]
struct Flags {
    fen: Option<String>,
    play: Vec<String>,
    speeds: Vec<Speed>,
    ratings: Vec<u16>,
    color: Option<Side>,
    nb: Option<u32>,
}

fn parse_flags(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for {}", flag))?;

        match flag.as_str() {
            "--fen" => flags.fen = Some(value.clone()),
            "--play" => flags.play = split_list(value),
            "--speeds" => {
                flags.speeds = split_list(value)
                    .iter()
                    .map(|s| Speed::parse(s).ok_or_else(|| format!("Unknown speed: {}", s)))
                    .collect::<Result<_, _>>()?;
            }
            "--ratings" => {
                flags.ratings = split_list(value)
                    .iter()
                    .map(|r| r.parse().map_err(|_| format!("Bad rating: {}", r)))
                    .collect::<Result<_, _>>()?;
            }
            "--color" => {
                flags.color = Some(Side::parse(value).ok_or_else(|| format!("Unknown color: {}", value))?);
            }
            "--nb" => flags.nb = Some(value.parse().map_err(|_| format!("Bad number: {}", value))?),
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(flags)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let settings = Settings::from_env();
    let client = match ExplorerClient::from_settings(&settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] Failed to create client: {}", e);
            process::exit(1);
        }
    };

    let (command, rest) = (args[1].as_str(), &args[2..]);
    let (username, rest) = match command {
        "player" if !rest.is_empty() => (Some(rest[0].clone()), &rest[1..]),
        "player" => {
            println!("Error: Please provide a username");
            print_usage(&args[0]);
            process::exit(1);
        }
        _ => (None, rest),
    };

    let flags = match parse_flags(rest) {
        Ok(f) => f,
        Err(e) => {
            println!("Error: {}", e);
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let result = match (command, username) {
        ("lichess", _) => client.lichess(&explorer_params(&flags)).await,
        ("masters", _) => client.masters(&explorer_params(&flags)).await,
        ("player", Some(name)) => client.player(&name, &player_params(&flags)).await,
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    match result {
        Ok(resp) => print_response(&resp, flags.nb.unwrap_or(10) as usize),
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            process::exit(1);
        }
    }
}

fn explorer_params(flags: &Flags) -> ExplorerParams {
    let mut params = ExplorerParams::new()
        .play(flags.play.clone())
        .speeds(&flags.speeds)
        .ratings(&flags.ratings);
    if let Some(ref fen) = flags.fen {
        params = params.fen(fen.clone());
    }
    if let Some(nb) = flags.nb {
        params = params.moves(nb);
    }
    params
}

fn player_params(flags: &Flags) -> PlayerParams {
    let mut params = PlayerParams::new()
        .play(flags.play.clone())
        .speeds(&flags.speeds);
    if let Some(color) = flags.color {
        params = params.color(color);
    }
    if let Some(ref fen) = flags.fen {
        params = params.fen(fen.clone());
    }
    if let Some(nb) = flags.nb {
        params = params.moves(nb);
    }
    params
}

fn print_response(resp: &ExplorerResponse, limit: usize) {
    if let Some(ref opening) = resp.opening {
        println!("Opening: {} ({})", opening.name, opening.eco);
    }
    println!("Total games: {}", resp.total());
    println!("White wins: {}  Draws: {}  Black wins: {}", resp.white, resp.draws, resp.black);
    println!();

    if resp.moves.is_empty() {
        println!("No moves returned.");
        return;
    }

    println!("Most popular moves:");
    for (i, mv) in resp.moves.iter().take(limit).enumerate() {
        let score = mv
            .white_score()
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. {:8} {:6} games: {:>9}  white:{}  draws:{}  black:{}  white%:{}",
            i + 1,
            mv.san,
            mv.uci,
            mv.total(),
            mv.white,
            mv.draws,
            mv.black,
            score
        );
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  lichess                 Lichess games database");
    println!("  masters                 Masters database");
    println!("  player <username>       One player's games");
    println!();
    println!("Options:");
    println!("  --fen <FEN>             Position to explore");
    println!("  --play <uci,uci,...>    Moves from the starting position");
    println!("  --speeds <list>         e.g. blitz,rapid");
    println!("  --ratings <list>        e.g. 2000,2200,2500");
    println!("  --color <white|black>   Player side (player command)");
    println!("  --nb <N>                Number of moves to show");
    println!();
    println!("Set LICHESS_TOKEN for authenticated requests.");
}
