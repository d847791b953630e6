//! Runs a relay and two AI clients over loopback TCP and prints a JSON
//! summary of the game.

use std::time::Duration;

use board_battle::{
    AiPlayer, GameClient, GameConfig, GameOutcome, RelayConfig, RelayServer, Verdict,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn winner(outcome: &GameOutcome) -> Option<String> {
    match outcome.verdict {
        Verdict::Winner(side) => Some(side.to_string()),
        Verdict::Draw | Verdict::NoContest => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    board_battle::init_logging(log::LevelFilter::Warn);
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        let program = args.first().map_or("sim", String::as_str);
        eprintln!("Usage: {} <seed1> <seed2>", program);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let relay = RelayServer::bind(RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        seed: Some(seed1 ^ seed2.rotate_left(32)),
        ..RelayConfig::default()
    })
    .await?;
    let addr = relay.local_addr()?;
    let relay = tokio::spawn(relay.run());

    let config = GameConfig::default()
        .with_turn_time(Duration::from_secs(2))
        .with_tick(Duration::from_millis(5));
    let client_a = GameClient::connect(addr, config).await?;
    let client_b = GameClient::connect(addr, config).await?;

    let a = tokio::spawn(async move {
        let mut rng = SmallRng::seed_from_u64(seed1);
        let mut player = AiPlayer::new();
        let outcome = client_a.run(&mut player, &mut rng).await;
        outcome
    });
    let b = tokio::spawn(async move {
        let mut rng = SmallRng::seed_from_u64(seed2);
        let mut player = AiPlayer::new();
        let outcome = client_b.run(&mut player, &mut rng).await;
        outcome
    });
    let (res_a, res_b) = tokio::try_join!(a, b)?;
    let (out_a, out_b) = (res_a?, res_b?);
    let report = tokio::time::timeout(Duration::from_secs(5), relay).await???;

    let result = json!({
        "seed": report.seed,
        "first": report.first.to_string(),
        "A": {"verdict": format!("{:?}", out_a.verdict), "reason": format!("{:?}", out_a.reason)},
        "B": {"verdict": format!("{:?}", out_b.verdict), "reason": format!("{:?}", out_b.reason)},
        "agree": out_a == out_b,
        "winner": winner(&out_a),
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
