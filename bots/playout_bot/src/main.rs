mod playout;

use clap::Parser;
use connect_four_bot_utils::Bot;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::playout::best_column;

#[derive(Parser)]
struct Args {
    /// Host the judge runs on
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port the judge listens on for this player
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Random playouts per candidate column
    #[arg(long, default_value_t = 500)]
    playouts: u32,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

/// Monte-Carlo player: tries every legal column, finishes the game randomly
/// many times, and keeps the column that wins most often.
struct PlayoutBot {
    rng: StdRng,
    playouts: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, playouts = args.playouts);

    PlayoutBot {
        rng: StdRng::seed_from_u64(seed),
        playouts: args.playouts,
    }
    .run((args.host.as_str(), args.port))
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

impl Bot for PlayoutBot {
    fn name(&self) -> String {
        String::from("PlayoutBot")
    }

    fn choose_column(&mut self, own: u64, opp: u64, _history: &[u8], legal_moves: &[u8]) -> u8 {
        let col = best_column(&mut self.rng, own, opp, legal_moves, self.playouts);
        info!(col, "Chose column");
        col
    }
}
