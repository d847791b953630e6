#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ai;
pub mod board;
pub mod chip;
pub mod combat;
pub mod common;
pub mod config;
pub mod game;

#[cfg(feature = "std")]
pub mod arbiter;
#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
pub mod local;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod player;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod relay;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod ui;

pub use ai::{choose_action, AiChoice};
pub use board::Board;
pub use chip::{Chip, ChipKind, Side};
pub use combat::{can_attack, resolve, should_update_defeat, tally, Encounter, Verdict};
pub use common::{Action, Coord, MoveRecord, ParseError, RuleError};
pub use config::*;
pub use game::{EndReason, GameOutcome, GameSession};

#[cfg(feature = "std")]
pub use arbiter::{GameEvent, ProtocolFault, TurnArbiter, TurnInput, TurnState};
#[cfg(feature = "std")]
pub use client::GameClient;
#[cfg(feature = "std")]
pub use local::LocalMatch;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use player::{AiPlayer, CliPlayer, Player, TurnView};
#[cfg(feature = "std")]
pub use protocol::Message;
#[cfg(feature = "std")]
pub use relay::{RelayConfig, RelayReport, RelayServer};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, ChannelError};
