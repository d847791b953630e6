//! Wire messages exchanged between clients and the relay.
//!
//! Each message is a JSON object tagged by its `type` field, for example
//! `{"type":"start","first":"B","seed":42}`. Unknown keys (such as the
//! relay's optional `_from` origin tag) are ignored on decode.

use crate::chip::{ChipKind, Side};
use crate::common::{Action, Coord, MoveRecord};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Relay → client: your side for this session.
    Welcome { side: Side },
    /// Relay → both clients: shared board seed and starting side.
    Start { first: Side, seed: u64 },
    /// Client → peer: one resolved action.
    Move {
        from: Coord,
        to: Coord,
        action: Action,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        defeat: Option<ChipKind>,
    },
    /// Client → peer: the turn timer ran out (or the player passed).
    Idle,
    /// Relay → client: the other side's connection ended.
    PeerDisconnect,
}

impl Message {
    /// Encode to the compact JSON payload carried inside a frame.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode a frame payload.
    pub fn from_payload(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Welcome { .. } => "welcome",
            Message::Start { .. } => "start",
            Message::Move { .. } => "move",
            Message::Idle => "idle",
            Message::PeerDisconnect => "peer_disconnect",
        }
    }
}

impl From<MoveRecord> for Message {
    fn from(record: MoveRecord) -> Self {
        Message::Move {
            from: record.from,
            to: record.to,
            action: record.action,
            defeat: record.defeat,
        }
    }
}
