//! Turn state machine shared by the networked client and the local match.
//!
//! The arbiter owns one [`GameSession`] replica and decides which inputs are
//! legal in which state. It never performs I/O: callers feed it local input,
//! peer actions and the current time, then transmit whatever it returns.

use std::fmt;
use std::time::{Duration, Instant};

use crate::{
    chip::Side,
    combat::Verdict,
    common::{Coord, MoveRecord, RuleError},
    config::{GameConfig, Rules},
    game::{EndReason, GameOutcome, GameSession},
};

/// Where the local side stands in the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    WaitingForStart,
    MyTurnIdle,
    MyTurnSelected(Coord),
    WaitingForPeer,
    GameOver,
}

/// Notifications for observers (renderers, players).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Welcomed(Side),
    Started { me: Side, first: Side, seed: u64 },
    Applied { side: Side, record: MoveRecord },
    Idled { side: Side },
    Ended(GameOutcome),
}

/// A local player's request during its own turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnInput {
    /// Pick (or re-pick) one of our chips.
    Select(Coord),
    /// Act with the selected chip on this cell.
    Target(Coord),
    /// Select and act in one step.
    Act { from: Coord, to: Coord },
    /// Give up the turn.
    Pass,
}

/// What a completed local turn needs to tell the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Move(MoveRecord),
    Idle,
}

/// Peer input that is not acceptable in the current state. The session has
/// already been ended when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolFault {
    Unexpected { what: &'static str, state: TurnState },
    Rule(RuleError),
}

impl fmt::Display for ProtocolFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolFault::Unexpected { what, state } => {
                write!(f, "unexpected {} while in {:?}", what, state)
            }
            ProtocolFault::Rule(e) => write!(f, "peer action rejected: {}", e),
        }
    }
}

impl std::error::Error for ProtocolFault {}

pub struct TurnArbiter {
    me: Option<Side>,
    rules: Rules,
    turn_time: Duration,
    session: Option<GameSession>,
    state: TurnState,
    deadline: Option<Instant>,
    outcome: Option<GameOutcome>,
    events: Vec<GameEvent>,
}

impl TurnArbiter {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            me: None,
            rules: config.rules,
            turn_time: config.turn_time,
            session: None,
            state: TurnState::WaitingForStart,
            deadline: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    pub fn me(&self) -> Option<Side> {
        self.me
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.state == TurnState::GameOver
    }

    pub fn is_my_turn(&self) -> bool {
        matches!(self.state, TurnState::MyTurnIdle | TurnState::MyTurnSelected(_))
    }

    pub fn selected(&self) -> Option<Coord> {
        match self.state {
            TurnState::MyTurnSelected(at) => Some(at),
            _ => None,
        }
    }

    /// Time left on the local turn timer.
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Take the notifications produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record the side assigned by the relay.
    pub fn welcome(&mut self, side: Side) -> Result<(), ProtocolFault> {
        if self.me.is_some() || self.state != TurnState::WaitingForStart {
            return Err(self.unexpected("welcome"));
        }
        self.me = Some(side);
        self.events.push(GameEvent::Welcomed(side));
        Ok(())
    }

    /// Build the board from the shared seed and enter the first turn.
    pub fn start(&mut self, first: Side, seed: u64, now: Instant) -> Result<(), ProtocolFault> {
        let Some(me) = self.me else {
            return Err(self.unexpected("start"));
        };
        if self.state != TurnState::WaitingForStart {
            return Err(self.unexpected("start"));
        }
        let session = GameSession::new(seed, first, self.rules);
        log::info!(
            "game started: playing side {}, side {} first, board {:016x}",
            me,
            first,
            session.board().fingerprint()
        );
        self.session = Some(session);
        self.events.push(GameEvent::Started { me, first, seed });
        self.sync_state(now);
        Ok(())
    }

    /// Pick one of our own chips.
    pub fn select(&mut self, at: Coord) -> Result<(), RuleError> {
        let me = self.acting_side()?;
        let chip = self.session()
            .and_then(|s| s.board().get(at))
            .ok_or(RuleError::EmptySource)?;
        if chip.side != me {
            return Err(RuleError::NotOwnChip);
        }
        self.state = TurnState::MyTurnSelected(at);
        Ok(())
    }

    /// Drop the current selection.
    pub fn deselect(&mut self) {
        if let TurnState::MyTurnSelected(_) = self.state {
            self.state = TurnState::MyTurnIdle;
        }
    }

    /// Act with the selected chip on an adjacent cell. The returned record
    /// must be sent to the peer.
    pub fn choose_target(&mut self, to: Coord, now: Instant) -> Result<MoveRecord, RuleError> {
        let me = self.acting_side()?;
        let TurnState::MyTurnSelected(from) = self.state else {
            return Err(RuleError::NothingSelected);
        };
        let session = self.session.as_mut().ok_or(RuleError::GameNotStarted)?;
        let record = session.apply_action(me, from, to)?;
        self.events.push(GameEvent::Applied { side: me, record });
        self.sync_state(now);
        Ok(record)
    }

    /// Give up the turn without acting. The caller must send `idle`.
    pub fn pass(&mut self, now: Instant) -> Result<(), RuleError> {
        let me = self.acting_side()?;
        let session = self.session.as_mut().ok_or(RuleError::GameNotStarted)?;
        session.record_idle(me)?;
        self.events.push(GameEvent::Idled { side: me });
        self.sync_state(now);
        Ok(())
    }

    /// Apply a player request. `Ok(None)` means the turn is still open.
    pub fn submit(&mut self, input: TurnInput, now: Instant) -> Result<Option<Submitted>, RuleError> {
        match input {
            TurnInput::Select(at) => self.select(at).map(|()| None),
            TurnInput::Target(to) => self.choose_target(to, now).map(|r| Some(Submitted::Move(r))),
            TurnInput::Act { from, to } => {
                let previous = self.state;
                self.select(from)?;
                match self.choose_target(to, now) {
                    Ok(record) => Ok(Some(Submitted::Move(record))),
                    Err(e) => {
                        self.state = previous;
                        Err(e)
                    }
                }
            }
            TurnInput::Pass => self.pass(now).map(|()| Some(Submitted::Idle)),
        }
    }

    /// Pass automatically once the turn timer has run out. Returns `true`
    /// when that happened and an `idle` must be sent.
    pub fn poll_timeout(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.is_my_turn() && now >= deadline => {
                log::info!("turn timer expired");
                self.pass(now).is_ok()
            }
            _ => false,
        }
    }

    /// Apply the peer's action to our replica.
    pub fn peer_move(&mut self, record: MoveRecord, now: Instant) -> Result<(), ProtocolFault> {
        let peer = self.peer_turn("move")?;
        let outcome = match self.session.as_mut() {
            Some(session) => session.apply_record(peer, &record),
            None => Err(RuleError::GameNotStarted),
        };
        if let Err(e) = outcome {
            log::warn!("rejecting peer move {:?}: {}", record, e);
            self.finish(Verdict::NoContest, EndReason::ProtocolViolation);
            return Err(ProtocolFault::Rule(e));
        }
        self.events.push(GameEvent::Applied { side: peer, record });
        self.sync_state(now);
        Ok(())
    }

    /// The peer's turn passed without an action.
    pub fn peer_idle(&mut self, now: Instant) -> Result<(), ProtocolFault> {
        let peer = self.peer_turn("idle")?;
        if let Some(Err(e)) = self.session.as_mut().map(|s| s.record_idle(peer)) {
            self.finish(Verdict::NoContest, EndReason::ProtocolViolation);
            return Err(ProtocolFault::Rule(e));
        }
        self.events.push(GameEvent::Idled { side: peer });
        self.sync_state(now);
        Ok(())
    }

    /// The relay reported the other side gone; the remaining side wins.
    pub fn peer_disconnected(&mut self) {
        let verdict = match (self.me, &self.session) {
            (Some(me), Some(_)) => Verdict::Winner(me),
            _ => Verdict::NoContest,
        };
        self.finish(verdict, EndReason::PeerDisconnected);
    }

    /// Our own connection closed or failed.
    pub fn connection_lost(&mut self) {
        self.finish(Verdict::NoContest, EndReason::ConnectionLost);
    }

    fn acting_side(&self) -> Result<Side, RuleError> {
        match self.state {
            TurnState::WaitingForStart => Err(RuleError::GameNotStarted),
            TurnState::GameOver => Err(RuleError::GameOver),
            TurnState::WaitingForPeer => Err(RuleError::NotYourTurn),
            TurnState::MyTurnIdle | TurnState::MyTurnSelected(_) => {
                self.me.ok_or(RuleError::GameNotStarted)
            }
        }
    }

    fn peer_turn(&mut self, what: &'static str) -> Result<Side, ProtocolFault> {
        match (self.state, self.me) {
            (TurnState::WaitingForPeer, Some(me)) => Ok(me.opponent()),
            _ => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&mut self, what: &'static str) -> ProtocolFault {
        let fault = ProtocolFault::Unexpected {
            what,
            state: self.state,
        };
        if self.state != TurnState::GameOver {
            log::warn!("{}", fault);
            self.finish(Verdict::NoContest, EndReason::ProtocolViolation);
        }
        fault
    }

    fn finish(&mut self, verdict: Verdict, reason: EndReason) {
        if self.state == TurnState::GameOver {
            return;
        }
        let outcome = match self.session.as_mut() {
            Some(session) => {
                session.end(verdict, reason);
                session.outcome()
            }
            None => None,
        };
        let outcome = outcome.unwrap_or(GameOutcome { verdict, reason });
        self.enter_game_over(outcome);
    }

    fn enter_game_over(&mut self, outcome: GameOutcome) {
        log::info!("game over: {:?} ({:?})", outcome.verdict, outcome.reason);
        self.state = TurnState::GameOver;
        self.deadline = None;
        self.outcome = Some(outcome);
        self.events.push(GameEvent::Ended(outcome));
    }

    /// Move to the state implied by the session after an action.
    fn sync_state(&mut self, now: Instant) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let Some(outcome) = session.outcome() {
            self.enter_game_over(outcome);
        } else if Some(session.current_side()) == self.me {
            self.state = TurnState::MyTurnIdle;
            // A turn time too large to represent means the turn never expires.
            self.deadline = now.checked_add(self.turn_time);
        } else {
            self.state = TurnState::WaitingForPeer;
            self.deadline = None;
        }
    }
}
