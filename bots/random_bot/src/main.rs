use clap::Parser;
use connect_four_bot_utils::Bot;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Host the judge runs on
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port the judge listens on for this player
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);
    let rng = StdRng::seed_from_u64(seed);

    RandomBot { rng }.run((args.host.as_str(), args.port))
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Plays a uniformly random legal column.
struct RandomBot {
    rng: StdRng,
}

impl Bot for RandomBot {
    fn name(&self) -> String {
        String::from("RandomBot")
    }

    fn choose_column(&mut self, _own: u64, _opp: u64, _history: &[u8], legal_moves: &[u8]) -> u8 {
        // The judge never asks for a move on a full board
        legal_moves.choose(&mut self.rng).copied().unwrap_or(0)
    }
}
