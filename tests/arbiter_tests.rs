#![cfg(feature = "std")]

use std::time::{Duration, Instant};

use board_battle::arbiter::Submitted;
use board_battle::{
    choose_action, Action, EndReason, GameConfig, GameEvent, GameOutcome, ProtocolFault,
    RuleError, Rules, Side, TurnArbiter, TurnInput, TurnState, Verdict,
};
use rand::{rngs::SmallRng, SeedableRng};

const SEED: u64 = 2024;

fn seated(side: Side, first: Side, config: &GameConfig, now: Instant) -> TurnArbiter {
    let mut arbiter = TurnArbiter::new(config);
    arbiter.welcome(side).unwrap();
    arbiter.start(first, SEED, now).unwrap();
    arbiter
}

fn pair(first: Side, config: &GameConfig, now: Instant) -> (TurnArbiter, TurnArbiter) {
    (
        seated(Side::A, first, config, now),
        seated(Side::B, first, config, now),
    )
}

/// Let whoever holds the turn act (or pass) and mirror it on the other.
fn step(a: &mut TurnArbiter, b: &mut TurnArbiter, rng: &mut SmallRng, now: Instant) {
    let (actor, observer) = if a.is_my_turn() { (a, b) } else { (b, a) };
    let me = actor.me().unwrap();
    let board = actor.session().unwrap().board().clone();
    let input = match choose_action(&board, me, rng).endpoints() {
        Some((from, to)) => TurnInput::Act { from, to },
        None => TurnInput::Pass,
    };
    match actor.submit(input, now).unwrap() {
        Some(Submitted::Move(record)) => observer.peer_move(record, now).unwrap(),
        Some(Submitted::Idle) => observer.peer_idle(now).unwrap(),
        None => panic!("turn left open"),
    }
}

#[test]
fn start_hands_the_turn_to_the_first_side() {
    let now = Instant::now();
    let (a, b) = pair(Side::B, &GameConfig::default(), now);
    assert_eq!(a.state(), TurnState::WaitingForPeer);
    assert_eq!(b.state(), TurnState::MyTurnIdle);
    assert_eq!(b.time_left(now), Some(GameConfig::default().turn_time));
    assert_eq!(a.time_left(now), None);
    assert_eq!(
        a.session().unwrap().board().fingerprint(),
        b.session().unwrap().board().fingerprint()
    );
}

#[test]
fn events_report_welcome_and_start() {
    let mut a = seated(Side::A, Side::A, &GameConfig::default(), Instant::now());
    assert_eq!(
        a.drain_events(),
        vec![
            GameEvent::Welcomed(Side::A),
            GameEvent::Started {
                me: Side::A,
                first: Side::A,
                seed: SEED
            }
        ]
    );
    assert!(a.drain_events().is_empty());
}

#[test]
fn selection_rules() {
    let now = Instant::now();
    let (mut a, _) = pair(Side::A, &GameConfig::default(), now);
    let board = a.session().unwrap().board().clone();
    let mine = board.positions_of(Side::A).next().unwrap();
    let theirs = board.positions_of(Side::B).next().unwrap();

    assert_eq!(a.choose_target(theirs, now), Err(RuleError::NothingSelected));
    assert_eq!(a.select(theirs), Err(RuleError::NotOwnChip));
    a.select(mine).unwrap();
    assert_eq!(a.state(), TurnState::MyTurnSelected(mine));
    a.deselect();
    assert_eq!(a.state(), TurnState::MyTurnIdle);
}

#[test]
fn inputs_outside_my_turn_are_refused() {
    let now = Instant::now();
    let (mut a, _) = pair(Side::B, &GameConfig::default(), now);
    let mine = a.session().unwrap().board().positions_of(Side::A).next().unwrap();
    assert_eq!(a.select(mine), Err(RuleError::NotYourTurn));
    assert_eq!(a.pass(now), Err(RuleError::NotYourTurn));

    let mut fresh = TurnArbiter::new(&GameConfig::default());
    assert_eq!(fresh.pass(now), Err(RuleError::GameNotStarted));
}

#[test]
fn failed_combined_action_keeps_the_turn_open() {
    let now = Instant::now();
    let (mut a, _) = pair(Side::A, &GameConfig::default(), now);
    let board = a.session().unwrap().board().clone();
    let from = board.positions_of(Side::A).next().unwrap();
    let far = board
        .positions_of(Side::B)
        .find(|c| !c.is_adjacent(from))
        .unwrap();
    let err = a.submit(TurnInput::Act { from, to: far }, now).unwrap_err();
    assert_eq!(err, RuleError::NotAdjacent);
    assert_eq!(a.state(), TurnState::MyTurnIdle);
    assert!(a.is_my_turn());
}

#[test]
fn replicas_agree_through_a_whole_game() {
    let now = Instant::now();
    let (mut a, mut b) = pair(Side::A, &GameConfig::default(), now);
    let mut rng = SmallRng::seed_from_u64(77);
    for _ in 0..500 {
        if a.is_over() {
            break;
        }
        step(&mut a, &mut b, &mut rng, now);
        assert_eq!(
            a.session().unwrap().board().fingerprint(),
            b.session().unwrap().board().fingerprint()
        );
    }
    assert!(a.is_over() && b.is_over());
    assert_eq!(a.outcome(), b.outcome());
    let reason = a.outcome().unwrap().reason;
    assert!(matches!(
        reason,
        EndReason::TurnLimit | EndReason::Eliminated | EndReason::IdleForfeit(_)
    ));
    assert!(a.session().unwrap().turn_count() <= Rules::default().max_turns);
}

#[test]
fn turn_counter_counts_rounds() {
    let now = Instant::now();
    let (mut a, mut b) = pair(Side::B, &GameConfig::default(), now);
    let mut rng = SmallRng::seed_from_u64(3);
    step(&mut a, &mut b, &mut rng, now);
    assert_eq!(a.session().unwrap().turn_count(), 0);
    step(&mut a, &mut b, &mut rng, now);
    assert_eq!(a.session().unwrap().turn_count(), 1);
    assert_eq!(b.session().unwrap().turn_count(), 1);
}

#[test]
fn turn_limit_ends_with_a_tally() {
    let now = Instant::now();
    let rules = Rules {
        max_turns: 2,
        max_idle_turns: 5,
    };
    let config = GameConfig::default().with_rules(rules);
    let (mut a, mut b) = pair(Side::A, &config, now);
    for _ in 0..2 {
        a.pass(now).unwrap();
        b.peer_idle(now).unwrap();
        b.pass(now).unwrap();
        a.peer_idle(now).unwrap();
    }
    let expected = GameOutcome {
        verdict: Verdict::Draw,
        reason: EndReason::TurnLimit,
    };
    assert_eq!(a.outcome(), Some(expected));
    assert_eq!(b.outcome(), Some(expected));
}

#[test]
fn five_timeouts_in_a_row_forfeit() {
    let t0 = Instant::now();
    let config = GameConfig::default().with_turn_time(Duration::from_secs(15));
    let (mut a, mut b) = pair(Side::A, &config, t0);
    let mut rng = SmallRng::seed_from_u64(9);
    let mut now = t0;
    for round in 0..5 {
        assert!(!a.poll_timeout(now + Duration::from_secs(14)));
        now += Duration::from_secs(15);
        assert!(a.poll_timeout(now), "round {}", round);
        b.peer_idle(now).unwrap();
        if b.is_over() {
            break;
        }
        assert_eq!(a.session().unwrap().idle_count(Side::A), round + 1);
        // B keeps acting, so only A's counter grows.
        step(&mut a, &mut b, &mut rng, now);
    }
    let expected = GameOutcome {
        verdict: Verdict::Winner(Side::B),
        reason: EndReason::IdleForfeit(Side::A),
    };
    assert_eq!(a.outcome(), Some(expected));
    assert_eq!(b.outcome(), Some(expected));
}

#[test]
fn acting_resets_the_idle_counter() {
    let now = Instant::now();
    let (mut a, mut b) = pair(Side::A, &GameConfig::default(), now);
    let mut rng = SmallRng::seed_from_u64(4);
    a.pass(now).unwrap();
    b.peer_idle(now).unwrap();
    step(&mut a, &mut b, &mut rng, now);
    assert_eq!(b.session().unwrap().idle_count(Side::A), 1);
    step(&mut a, &mut b, &mut rng, now);
    assert_eq!(b.session().unwrap().idle_count(Side::A), 0);
}

#[test]
fn tampered_move_fails_closed() {
    let now = Instant::now();
    let (mut a, mut b) = pair(Side::A, &GameConfig::default(), now);
    let board = a.session().unwrap().board().clone();
    let mut rng = SmallRng::seed_from_u64(1);
    let (from, to) = choose_action(&board, Side::A, &mut rng).endpoints().unwrap();
    let mut record = match a.submit(TurnInput::Act { from, to }, now).unwrap() {
        Some(Submitted::Move(record)) => record,
        other => panic!("unexpected {:?}", other),
    };
    record.action = match record.action {
        Action::AttackSuccess => Action::AttackFail,
        _ => Action::AttackSuccess,
    };
    let fault = b.peer_move(record, now).unwrap_err();
    assert!(matches!(fault, ProtocolFault::Rule(RuleError::Desync { .. })));
    assert_eq!(
        b.outcome(),
        Some(GameOutcome {
            verdict: Verdict::NoContest,
            reason: EndReason::ProtocolViolation,
        })
    );
    assert_eq!(b.state(), TurnState::GameOver);
}

#[test]
fn messages_out_of_turn_fail_closed() {
    let now = Instant::now();
    let (mut a, _) = pair(Side::A, &GameConfig::default(), now);
    assert!(matches!(
        a.peer_idle(now),
        Err(ProtocolFault::Unexpected { what: "idle", .. })
    ));
    assert!(a.is_over());
    assert_eq!(a.outcome().unwrap().reason, EndReason::ProtocolViolation);

    let mut b = seated(Side::B, Side::A, &GameConfig::default(), now);
    assert!(b.start(Side::A, SEED, now).is_err());
    assert_eq!(b.outcome().unwrap().verdict, Verdict::NoContest);

    let mut c = TurnArbiter::new(&GameConfig::default());
    assert!(c.start(Side::A, SEED, now).is_err());
    assert!(c.is_over());
}

#[test]
fn disconnects() {
    let now = Instant::now();
    let (mut a, mut b) = pair(Side::A, &GameConfig::default(), now);
    a.peer_disconnected();
    assert_eq!(
        a.outcome(),
        Some(GameOutcome {
            verdict: Verdict::Winner(Side::A),
            reason: EndReason::PeerDisconnected,
        })
    );
    b.connection_lost();
    assert_eq!(
        b.outcome(),
        Some(GameOutcome {
            verdict: Verdict::NoContest,
            reason: EndReason::ConnectionLost,
        })
    );

    let mut waiting = TurnArbiter::new(&GameConfig::default());
    waiting.welcome(Side::A).unwrap();
    waiting.peer_disconnected();
    assert_eq!(waiting.outcome().unwrap().verdict, Verdict::NoContest);

    // Later events never overwrite the outcome.
    a.connection_lost();
    assert_eq!(a.outcome().unwrap().reason, EndReason::PeerDisconnected);
}

#[test]
fn unrepresentable_turn_time_never_expires() {
    let now = Instant::now();
    let config = GameConfig::default().with_turn_time(Duration::from_secs(u64::MAX));
    let (mut a, _) = pair(Side::A, &config, now);
    assert_eq!(a.state(), TurnState::MyTurnIdle);
    assert_eq!(a.time_left(now), None);
    assert!(!a.poll_timeout(now + Duration::from_secs(3600)));
    assert!(a.is_my_turn());
}
