//! chess-perft - counts legal move paths for chess and its variants.
//!
//! Runs perft on a single position (optionally split per root move) or
//! checks a TOML suite of positions against known node counts.

mod suite;

use anyhow::{bail, Context as _};
use chess_core::parse_fen;
use chess_rules::{perft, perft_divide, Position, Rules};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use suite::Suite;
use tracing_subscriber::EnvFilter;

/// chess-perft - Counts legal move paths for chess and its variants.
#[derive(Parser)]
#[command(name = "chess-perft")]
#[command(about = "Counts legal move paths for chess and its variants")]
struct Args {
    /// FEN of the root position. Defaults to the variant's start position
    #[arg(long)]
    fen: Option<String>,

    /// Variant: chess, antichess, kingofthehill, 3check, atomic, horde,
    /// racingkings or crazyhouse
    #[arg(long, default_value = "chess")]
    variant: Rules,

    /// Search depth. With --suite, limits the depths checked
    #[arg(long)]
    depth: Option<u32>,

    /// Print the node count below each root move
    #[arg(long)]
    divide: bool,

    /// Run a TOML perft suite instead of a single position
    #[arg(long, conflicts_with_all = ["fen", "divide"])]
    suite: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

const DEFAULT_DEPTH: u32 = 4;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &args.suite {
        Some(path) => run_suite(path, args.depth),
        None => run_position(&args),
    }
}

fn run_suite(path: &Path, max_depth: Option<u32>) -> anyhow::Result<()> {
    let suite = Suite::load(path).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!("Running {} positions from {:?}", suite.positions.len(), path);

    let mismatches = suite.run(max_depth)?;
    if mismatches.is_empty() {
        println!("all {} positions passed", suite.positions.len());
        return Ok(());
    }
    for mismatch in &mismatches {
        println!("FAIL {}", mismatch);
    }
    bail!("{} mismatching node counts", mismatches.len())
}

fn run_position(args: &Args) -> anyhow::Result<()> {
    let pos = match &args.fen {
        Some(fen) => {
            let setup = parse_fen(fen).with_context(|| format!("parsing FEN {:?}", fen))?;
            Position::from_setup(&setup, args.variant)
                .with_context(|| format!("setting up {} position", args.variant))?
        }
        None => Position::new(args.variant),
    };
    let depth = args.depth.unwrap_or(DEFAULT_DEPTH);
    tracing::debug!(position = ?pos, depth, "root");

    let start = Instant::now();
    let nodes = if args.divide {
        let divide = perft_divide(&pos, depth);
        for (uci, count) in &divide {
            println!("{}: {}", uci, count);
        }
        println!();
        divide.iter().map(|(_, count)| count).sum()
    } else {
        perft(&pos, depth)
    };
    let elapsed = start.elapsed();

    println!("{}", nodes);
    let nps = nodes as f64 / elapsed.as_secs_f64().max(1e-9);
    tracing::info!(
        variant = %args.variant,
        depth,
        nodes,
        elapsed_ms = elapsed.as_millis() as u64,
        nps = nps as u64,
        "perft done"
    );
    Ok(())
}
