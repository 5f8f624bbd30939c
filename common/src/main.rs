use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use satsweeper::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum AgentKind {
    /// Refutation proofs, then sampled probabilities
    Sat,
    /// Uniformly random reveals
    Random,
}

#[derive(Parser, Debug)]
#[command(name = "satsweeper")]
#[command(about = "Plays Minesweeper with a SAT solver and reports how often it wins")]
struct Args {
    /// Board layout file (`*` mine, `.` safe, one row per line). Random boards otherwise.
    #[arg(long, value_name = "FILE")]
    field: Option<PathBuf>,

    #[arg(long, default_value = "9")]
    width: usize,

    #[arg(long, default_value = "9")]
    height: usize,

    #[arg(long, default_value = "10")]
    mines: usize,

    /// Number of games to play
    #[arg(short, long, default_value = "100")]
    games: usize,

    /// Seed for boards and agent choices
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, value_enum, default_value = "sat")]
    agent: AgentKind,

    /// Model sampling budget per estimation, in milliseconds
    #[arg(long, default_value = "50")]
    sample_ms: u64,

    /// Narrate every step of the first game
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::INFO } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let layout: Option<Minefield> = match &args.field {
        Some(path) => Some(std::fs::read_to_string(path)?.parse()?),
        None => None,
    };

    let base = Config {
        rng_seed: args.seed,
        sample_time_cap: Duration::from_millis(args.sample_ms),
        ..Config::default()
    };
    let mut board_rng = base.rng();

    println!("--- Minesweeper Bot ({:?}) ---", args.agent);
    let mut wins = 0;
    let mut win_time = Duration::ZERO;
    let mut interrupted_games = 0;

    for game in 0..args.games {
        let config = Config {
            verbose: args.verbose && game == 0,
            rng_seed: args.seed.map(|seed| seed.wrapping_add(game as u64)),
            ..base.clone()
        };
        let mut field = match &layout {
            Some(field) => field.clone(),
            None => Minefield::random(
                args.width,
                args.height,
                args.mines,
                Some(config.first_move),
                &mut board_rng,
            )?,
        };
        let (width, height) = field.dimensions();

        let started = Instant::now();
        let outcome = match args.agent {
            AgentKind::Sat => {
                let mut agent = SatAgent::new(width, height, config);
                let outcome = agent.play(&mut field)?;
                if agent.stats().interrupted_samplings > 0 {
                    interrupted_games += 1;
                }
                outcome
            }
            AgentKind::Random => RandomAgent::new(width, height, config).play(&mut field)?,
        };

        if outcome == Outcome::Solved {
            wins += 1;
            win_time += started.elapsed();
        }
        print!("\rGame {}/{}: {} won", game + 1, args.games, wins);
    }

    println!("\n\n--- Results ---");
    let rate = 100.0 * wins as f64 / args.games.max(1) as f64;
    println!("Success rate: {rate:.1}%");
    if wins > 0 {
        println!(
            "Average duration (on success): {:.3}s",
            win_time.as_secs_f64() / wins as f64
        );
    }
    if interrupted_games > 0 {
        println!("Model sampling was interrupted in {interrupted_games} game(s).");
    }
    Ok(())
}
