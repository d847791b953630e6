//! Single-machine game against the built-in AI.
//!
//! Uses the same [`TurnArbiter`] as the networked client. The local player
//! is side A and moves first; where a network client would wait for the
//! peer, side B's action is computed on the spot.

use std::time::Instant;

use rand::rngs::SmallRng;
use tokio::time::MissedTickBehavior;

use crate::{
    ai::{self, AiChoice},
    arbiter::{TurnArbiter, TurnInput, TurnState},
    chip::Side,
    combat,
    common::RuleError,
    config::GameConfig,
    game::GameOutcome,
    player::{Player, TurnView},
};

const HUMAN: Side = Side::A;
const COMPUTER: Side = Side::B;

pub struct LocalMatch {
    arbiter: TurnArbiter,
    config: GameConfig,
    ai_rng: SmallRng,
}

impl LocalMatch {
    /// Deal the board for `seed` and hand the first turn to side A.
    pub fn new(seed: u64, config: GameConfig, ai_rng: SmallRng) -> anyhow::Result<Self> {
        let mut arbiter = TurnArbiter::new(&config);
        arbiter.welcome(HUMAN)?;
        arbiter.start(HUMAN, seed, Instant::now())?;
        Ok(Self {
            arbiter,
            config,
            ai_rng,
        })
    }

    pub fn arbiter(&self) -> &TurnArbiter {
        &self.arbiter
    }

    /// Apply a request from the local player.
    pub fn submit(&mut self, input: TurnInput, now: Instant) -> Result<(), RuleError> {
        self.arbiter.submit(input, now).map(|_| ())
    }

    /// Expire the local turn timer and let the AI act if it holds the turn.
    /// Returns `true` once the game is over.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.arbiter.poll_timeout(now);
        if self.arbiter.state() == TurnState::WaitingForPeer {
            self.computer_turn(now);
        }
        self.arbiter.is_over()
    }

    fn computer_turn(&mut self, now: Instant) {
        let Some(session) = self.arbiter.session() else {
            return;
        };
        let choice = ai::choose_action(session.board(), COMPUTER, &mut self.ai_rng);
        log::debug!("{} chose {:?}", COMPUTER.local_label(), choice);
        let planned = match choice {
            AiChoice::None => None,
            other => other
                .endpoints()
                .and_then(|(from, to)| match combat::plan(session.board(), COMPUTER, from, to) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        log::warn!("ai picked an illegal action {:?}: {}", choice, e);
                        None
                    }
                }),
        };
        let result = match planned {
            Some(record) => self.arbiter.peer_move(record, now),
            None => self.arbiter.peer_idle(now),
        };
        if let Err(fault) = result {
            log::error!("{}", fault);
        }
    }

    fn notify(&mut self, player: &mut dyn Player) {
        for event in self.arbiter.drain_events() {
            player.on_event(self.arbiter.session(), self.arbiter.me(), &event);
        }
    }

    /// Play until the game is over.
    pub async fn run(mut self, player: &mut dyn Player, rng: &mut SmallRng) -> anyhow::Result<GameOutcome> {
        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let now = Instant::now();
            let input = match self.arbiter.session() {
                Some(session) if self.arbiter.is_my_turn() => {
                    let view = TurnView {
                        session,
                        me: HUMAN,
                        selected: self.arbiter.selected(),
                        time_left: self.arbiter.time_left(now),
                    };
                    player.poll_turn(rng, &view)
                }
                _ => None,
            };
            if let Some(input) = input {
                if let Err(e) = self.submit(input, now) {
                    player.on_rejected(&input, &e);
                }
            }
            self.notify(player);
            let over = self.tick(now);
            self.notify(player);
            if over {
                break;
            }
        }
        self.arbiter
            .outcome()
            .ok_or_else(|| anyhow::anyhow!("game loop ended without an outcome"))
    }
}
