use std::net::{IpAddr, Ipv4Addr, TcpListener};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use connect_four::Side;
use judge::{Config, Match, PlayerHandle};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Address to accept player connections on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// Port the black (first) player connects to. 0 plays without a black player
    #[arg(long, default_value_t = 8000)]
    black_port: u16,

    /// Port the white (second) player connects to. 0 plays without a white player
    #[arg(long, default_value_t = 8001)]
    white_port: u16,

    /// Print the board after every turn
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    show_board: bool,

    /// Print the result of the match
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    show_result: bool,

    /// A player that takes longer than this to answer loses. Waits forever if not given
    #[arg(long)]
    move_timeout_ms: Option<u64>,

    /// Print a JSON report of the match to stdout
    #[arg(long, default_value_t = false)]
    json: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn listen(side: Side, host: IpAddr, port: u16) -> anyhow::Result<Option<TcpListener>> {
    if port == 0 {
        info!(%side, "Playing without a player");
        return Ok(None);
    }
    let listener = TcpListener::bind((host, port))
        .with_context(|| format!("Could not listen for the {} player on port {}", side, port))?;
    Ok(Some(listener))
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    // Bind both ports before waiting on either, so that the players can
    // connect in any order
    let listeners = [
        listen(Side::Black, args.host, args.black_port)?,
        listen(Side::White, args.host, args.white_port)?,
    ];
    let mut players = Vec::with_capacity(2);
    for (side, listener) in Side::BOTH.into_iter().zip(&listeners) {
        let player = match listener {
            Some(listener) => Some(PlayerHandle::accept(side, listener)?),
            None => None,
        };
        players.push(player);
    }
    let white = players.pop().flatten();
    let black = players.pop().flatten();

    let config = Config {
        move_timeout: args.move_timeout_ms.map(Duration::from_millis),
        show_board: args.show_board,
    };
    let report = Match::new(config, black, white).run();

    if args.show_result {
        println!("{}", report.result);
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(ExitCode::from(report.code))
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
