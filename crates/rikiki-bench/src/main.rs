use clap::Parser;

use rikiki_bench::logging::init_logging;
use rikiki_bench::simulator::{SimConfig, run};

/// Self-play benchmarking harness for rikiki bots.
#[derive(Debug, Parser)]
#[command(
    name = "rikiki-bench",
    author,
    version,
    about = "Deterministic rikiki self-play harness"
)]
struct Cli {
    /// Number of seats at the table (2 to 7).
    #[arg(short, long, default_value_t = 4)]
    players: usize,

    /// Number of complete games to play.
    #[arg(short, long, default_value_t = 100)]
    games: u32,

    /// RNG seed for deals and bot tie-breaks; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the report as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Log bot decisions (same as RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SimConfig {
        players: cli.players,
        games: cli.games,
        seed: cli.seed.unwrap_or_else(rand::random),
    };

    let report = run(&config)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
