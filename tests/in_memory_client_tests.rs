#![cfg(feature = "std")]

use std::time::Duration;

use board_battle::player::TurnView;
use board_battle::transport::{MessageSink, MessageSource};
use board_battle::{
    choose_action, AiPlayer, EndReason, GameClient, GameConfig, GameOutcome, GameSession,
    InMemoryTransport, Message, MoveRecord, Player, Rules, Side, TurnInput, Verdict,
};
use rand::{rngs::SmallRng, SeedableRng};
use tokio::time::timeout;

const LIMIT: Duration = Duration::from_secs(10);

/// Never decides anything; its turns run out.
struct Absent;

impl Player for Absent {
    fn poll_turn(&mut self, _rng: &mut SmallRng, _view: &TurnView<'_>) -> Option<TurnInput> {
        None
    }
}

fn fast() -> GameConfig {
    GameConfig::default()
        .with_turn_time(Duration::from_millis(30))
        .with_tick(Duration::from_millis(2))
}

fn spawn_client(
    config: GameConfig,
    mut player: impl Player + 'static,
) -> (InMemoryTransport, tokio::task::JoinHandle<anyhow::Result<GameOutcome>>) {
    let (ours, theirs) = InMemoryTransport::pair();
    let handle = tokio::spawn(async move {
        let (rx, tx) = theirs.into_split();
        let client = GameClient::new(rx, tx, config);
        let mut rng = SmallRng::seed_from_u64(8);
        let outcome = client.run(&mut player, &mut rng).await;
        outcome
    });
    (ours, handle)
}

#[tokio::test(flavor = "multi_thread")]
async fn idle_forfeit_after_five_timeouts() -> anyhow::Result<()> {
    let (mut relay, game) = spawn_client(fast(), Absent);
    relay.send(&Message::Welcome { side: Side::A }).await?;
    relay
        .send(&Message::Start {
            first: Side::A,
            seed: 11,
        })
        .await?;

    for turn in 1..=5 {
        let msg = timeout(LIMIT, relay.recv()).await??;
        assert_eq!(msg, Some(Message::Idle), "turn {}", turn);
        if turn < 5 {
            relay.send(&Message::Idle).await?;
        }
    }

    let outcome = timeout(LIMIT, game).await???;
    assert_eq!(
        outcome,
        GameOutcome {
            verdict: Verdict::Winner(Side::B),
            reason: EndReason::IdleForfeit(Side::A),
        }
    );
    assert_eq!(timeout(LIMIT, relay.recv()).await??, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn opponent_idling_out_loses() -> anyhow::Result<()> {
    let rules = Rules {
        max_turns: 60,
        max_idle_turns: 3,
    };
    let (mut relay, game) = spawn_client(fast().with_rules(rules), AiPlayer::new());
    relay.send(&Message::Welcome { side: Side::A }).await?;
    relay
        .send(&Message::Start {
            first: Side::B,
            seed: 12,
        })
        .await?;
    for _ in 0..3 {
        relay.send(&Message::Idle).await?;
        if let Some(reply) = timeout(LIMIT, relay.recv()).await?? {
            assert!(matches!(reply, Message::Move { .. } | Message::Idle));
        }
    }
    let outcome = timeout(LIMIT, game).await???;
    assert_eq!(outcome.verdict, Verdict::Winner(Side::A));
    assert_eq!(outcome.reason, EndReason::IdleForfeit(Side::B));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_connection_is_no_contest() -> anyhow::Result<()> {
    let (mut relay, game) = spawn_client(fast(), Absent);
    relay.send(&Message::Welcome { side: Side::B }).await?;
    drop(relay);
    let outcome = timeout(LIMIT, game).await???;
    assert_eq!(
        outcome,
        GameOutcome {
            verdict: Verdict::NoContest,
            reason: EndReason::ConnectionLost,
        }
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn move_during_own_turn_is_a_violation() -> anyhow::Result<()> {
    let (mut relay, game) = spawn_client(GameConfig::default(), Absent);
    relay.send(&Message::Welcome { side: Side::A }).await?;
    relay
        .send(&Message::Start {
            first: Side::A,
            seed: 3,
        })
        .await?;
    let session = GameSession::new(3, Side::A, Rules::default());
    let from = session.board().positions_of(Side::B).next().unwrap();
    let to = from.neighbors().next().unwrap();
    relay
        .send(&Message::Move {
            from,
            to,
            action: board_battle::Action::Move,
            defeat: None,
        })
        .await?;
    let outcome = timeout(LIMIT, game).await???;
    assert_eq!(
        outcome,
        GameOutcome {
            verdict: Verdict::NoContest,
            reason: EndReason::ProtocolViolation,
        }
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn client_and_reference_replica_stay_in_step() -> anyhow::Result<()> {
    let seed = 31337;
    let (mut relay, game) = spawn_client(fast(), AiPlayer::new());
    relay.send(&Message::Welcome { side: Side::B }).await?;
    relay.send(&Message::Start { first: Side::A, seed }).await?;

    // The test plays side A on its own replica and checks every reply.
    let mut session = GameSession::new(seed, Side::A, Rules::default());
    let mut rng = SmallRng::seed_from_u64(99);
    while !session.is_over() {
        if session.current_side() == Side::A {
            match choose_action(session.board(), Side::A, &mut rng).endpoints() {
                Some((from, to)) => {
                    let record = session.apply_action(Side::A, from, to).unwrap();
                    relay.send(&Message::from(record)).await?;
                }
                None => {
                    session.record_idle(Side::A).unwrap();
                    relay.send(&Message::Idle).await?;
                }
            }
        } else {
            match timeout(LIMIT, relay.recv()).await?? {
                Some(Message::Move {
                    from,
                    to,
                    action,
                    defeat,
                }) => {
                    let record = MoveRecord {
                        from,
                        to,
                        action,
                        defeat,
                    };
                    session.apply_record(Side::B, &record).unwrap();
                }
                Some(Message::Idle) => session.record_idle(Side::B).unwrap(),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    let outcome = timeout(LIMIT, game).await???;
    assert_eq!(Some(outcome), session.outcome());
    Ok(())
}
