#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use board_battle::{
    init_logging, ui, AiPlayer, CliPlayer, GameClient, GameConfig, LocalMatch, Player, RelayConfig,
    RelayServer, Side, DEFAULT_LISTEN_HOST, DEFAULT_PORT, DEFAULT_SERVER_HOST,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::{Rng, SeedableRng};
#[cfg(feature = "std")]
use std::time::Duration;

/// Upper bound accepted for `--turn-time` (one hour).
#[cfg(feature = "std")]
const MAX_TURN_TIME_SECS: u64 = 3600;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the relay that pairs two networked players.
    Serve {
        #[arg(long, default_value = DEFAULT_LISTEN_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, help = "Add a \"_from\" origin key to every forwarded message")]
        tag_origin: bool,
        #[arg(long, help = "Fix the board seed (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Fix the starting side (A or B)")]
        first: Option<Side>,
    },
    /// Connect to a relay and play.
    Join {
        #[arg(long, default_value = DEFAULT_SERVER_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(
            long,
            value_parser = clap::value_parser!(u64).range(1..=MAX_TURN_TIME_SECS),
            help = "Seconds per turn before an automatic pass"
        )]
        turn_time: Option<u64>,
        #[arg(long, help = "Fix the AI player's RNG seed")]
        ai_seed: Option<u64>,
    },
    /// Play against the built-in AI on this machine.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(
            long,
            value_parser = clap::value_parser!(u64).range(1..=MAX_TURN_TIME_SECS),
            help = "Seconds per turn before an automatic pass"
        )]
        turn_time: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn game_config(turn_time: Option<u64>) -> GameConfig {
    match turn_time {
        Some(secs) => GameConfig::default().with_turn_time(Duration::from_secs(secs)),
        None => GameConfig::default(),
    }
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(feature = "std")]
fn make_player(kind: PlayerType) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::new()),
        PlayerType::Ai => {
            println!("AI player selected.");
            Box::new(AiPlayer::new())
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(log::LevelFilter::Info);
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            tag_origin,
            seed,
            first,
        } => {
            let config = RelayConfig {
                host,
                port,
                tag_origin,
                seed,
                first,
            };
            let server = RelayServer::bind(config).await?;
            println!("Relay listening on {}", server.local_addr()?);
            let report = server.run().await?;
            println!(
                "Session over: side {} started (seed {}), side {} left first",
                report.first, report.seed, report.closed_by
            );
            println!(
                "Frames relayed: {} from A, {} from B",
                report.forwarded[Side::A.index()],
                report.forwarded[Side::B.index()]
            );
        }
        Commands::Join {
            host,
            port,
            player,
            turn_time,
            ai_seed,
        } => {
            println!("Connecting to relay at {}:{}...", host, port);
            let client = GameClient::connect((host.as_str(), port), game_config(turn_time)).await?;
            println!("Connected; waiting for an opponent...");
            let mut rng = make_rng(ai_seed);
            let mut player = make_player(player);
            let outcome = client.run(player.as_mut(), &mut rng).await?;
            println!("{}", ui::outcome_text(&outcome, None));
        }
        Commands::Local {
            seed,
            player,
            turn_time,
        } => {
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let board_seed = seed.unwrap_or_else(|| rand::rng().random());
            let ai_rng = make_rng(seed.map(|s| s.wrapping_add(1)));
            let mut rng = make_rng(seed.map(|s| s.wrapping_add(2)));
            let game = LocalMatch::new(board_seed, game_config(turn_time), ai_rng)?;
            let mut player = make_player(player);
            let outcome = game.run(player.as_mut(), &mut rng).await?;
            println!("{}", ui::outcome_text(&outcome, Some(Side::A)));
        }
    }
    Ok(())
}
