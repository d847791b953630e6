//! Fixed game constants and the runtime knobs derived from them.

use core::time::Duration;

use crate::chip::ChipKind;

pub const ROWS: usize = 5;
pub const COLS: usize = 6;

/// Chips fielded by each side, in roster order.
pub const ROSTER: [(ChipKind, usize); 7] = [
    (ChipKind::Orichi, 1),
    (ChipKind::Yagami, 2),
    (ChipKind::Kula, 2),
    (ChipKind::K, 2),
    (ChipKind::Mai, 2),
    (ChipKind::Kyo, 4),
    (ChipKind::Athena, 2),
];

/// Number of chips each side starts with.
pub const CHIPS_PER_SIDE: usize = 15;

pub const MAX_TURNS: u32 = 60;
pub const MAX_IDLE_TURNS: u32 = 5;
pub const TURN_TIME: Duration = Duration::from_secs(15);

/// How often the client main loop drains its inbox and samples the turn timer.
pub const TICK: Duration = Duration::from_millis(50);

pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 50007;

/// Terminal thresholds shared by both replicas. Both clients must use the
/// same values or their verdicts can diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub max_turns: u32,
    pub max_idle_turns: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_turns: MAX_TURNS,
            max_idle_turns: MAX_IDLE_TURNS,
        }
    }
}

/// Per-client timing and rule configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rules: Rules,
    pub turn_time: Duration,
    pub tick: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            turn_time: TURN_TIME,
            tick: TICK,
        }
    }
}

impl GameConfig {
    pub fn with_turn_time(mut self, turn_time: Duration) -> Self {
        self.turn_time = turn_time;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}
