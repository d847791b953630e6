use crate::{
    board::Board,
    chip::Side,
    combat::{self, Verdict},
    common::{Coord, MoveRecord, RuleError},
    config::Rules,
};

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The round limit was reached; material decides.
    TurnLimit,
    /// A side has no chips left; material decides.
    Eliminated,
    /// The given side idled too many turns in a row and forfeits.
    IdleForfeit(Side),
    /// The relay reported that the opponent left.
    PeerDisconnected,
    /// Our own connection failed or closed.
    ConnectionLost,
    /// The peer sent something illegal for the current state, or the two
    /// replicas no longer agree.
    ProtocolViolation,
}

/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub verdict: Verdict,
    pub reason: EndReason,
}

/// One client's replica of the game: board, turn bookkeeping and outcome.
///
/// Only actions cross the network. Both replicas apply the same sequence of
/// actions through this type and therefore stay identical.
#[derive(Clone, Debug)]
pub struct GameSession {
    board: Board,
    seed: u64,
    first: Side,
    current: Side,
    turn_count: u32,
    idle: [u32; 2],
    rules: Rules,
    outcome: Option<GameOutcome>,
}

impl GameSession {
    /// Start a game from the relay's seed and starting side.
    pub fn new(seed: u64, first: Side, rules: Rules) -> Self {
        let mut session = Self::from_board(Board::from_seed(seed), first, rules);
        session.seed = seed;
        session
    }

    /// Start from an arbitrary position.
    pub fn from_board(board: Board, first: Side, rules: Rules) -> Self {
        Self {
            board,
            seed: 0,
            first,
            current: first,
            turn_count: 0,
            idle: [0; 2],
            rules,
            outcome: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn first(&self) -> Side {
        self.first
    }

    /// Side expected to act next.
    pub fn current_side(&self) -> Side {
        self.current
    }

    /// Completed rounds. A round closes when the second mover acts.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Consecutive idle turns of `side`.
    pub fn idle_count(&self, side: Side) -> u32 {
        self.idle[side.index()]
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn check_turn(&self, side: Side) -> Result<(), RuleError> {
        if self.is_over() {
            return Err(RuleError::GameOver);
        }
        if self.current != side {
            return Err(RuleError::NotYourTurn);
        }
        Ok(())
    }

    /// Resolve `from` → `to` for `side` without applying it.
    pub fn plan(&self, side: Side, from: Coord, to: Coord) -> Result<MoveRecord, RuleError> {
        self.check_turn(side)?;
        combat::plan(&self.board, side, from, to)
    }

    /// Resolve and apply an action chosen on this replica.
    pub fn apply_action(&mut self, side: Side, from: Coord, to: Coord) -> Result<MoveRecord, RuleError> {
        let record = self.plan(side, from, to)?;
        self.commit(side, &record);
        Ok(record)
    }

    /// Apply an action reported by the peer.
    ///
    /// The action is re-planned locally first; a record that disagrees with
    /// our own resolution means the replicas have diverged.
    pub fn apply_record(&mut self, side: Side, record: &MoveRecord) -> Result<(), RuleError> {
        let expected = self.plan(side, record.from, record.to)?;
        if expected != *record {
            return Err(RuleError::Desync {
                expected,
                received: *record,
            });
        }
        self.commit(side, record);
        Ok(())
    }

    /// Record that `side` let its turn pass without acting.
    pub fn record_idle(&mut self, side: Side) -> Result<(), RuleError> {
        self.check_turn(side)?;
        let idle = &mut self.idle[side.index()];
        *idle += 1;
        log::debug!("side {} idle ({} in a row)", side, *idle);
        if *idle >= self.rules.max_idle_turns {
            self.outcome = Some(GameOutcome {
                verdict: Verdict::Winner(side.opponent()),
                reason: EndReason::IdleForfeit(side),
            });
            return Ok(());
        }
        self.finish_turn(side);
        Ok(())
    }

    /// End the game for a reason outside the rules (disconnect, fault).
    /// Has no effect once an outcome is set.
    pub fn end(&mut self, verdict: Verdict, reason: EndReason) {
        if self.outcome.is_none() {
            self.outcome = Some(GameOutcome { verdict, reason });
        }
    }

    fn commit(&mut self, side: Side, record: &MoveRecord) {
        combat::commit(&mut self.board, record);
        self.idle[side.index()] = 0;
        log::debug!(
            "side {} {:?} {} -> {} (board {:016x})",
            side,
            record.action,
            record.from,
            record.to,
            self.board.fingerprint()
        );
        self.finish_turn(side);
    }

    fn finish_turn(&mut self, side: Side) {
        if side != self.first {
            self.turn_count += 1;
        }
        self.current = side.opponent();

        if Side::BOTH.iter().any(|s| self.board.chip_count(*s) == 0) {
            self.outcome = Some(GameOutcome {
                verdict: combat::tally(&self.board),
                reason: EndReason::Eliminated,
            });
        } else if self.turn_count >= self.rules.max_turns {
            self.outcome = Some(GameOutcome {
                verdict: combat::tally(&self.board),
                reason: EndReason::TurnLimit,
            });
        }
    }
}
