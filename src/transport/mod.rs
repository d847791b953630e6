use tokio::time::Duration;

use crate::protocol::Message;

/// Failures of the message channel. Any of them ends the session; nothing
/// is retried.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("send timeout after {0:?}")]
    Timeout(Duration),
}

/// Write half of a message channel.
#[async_trait::async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, msg: &Message) -> Result<(), ChannelError>;
}

/// Read half of a message channel.
///
/// `Ok(None)` means the peer closed the stream, including mid-frame.
#[async_trait::async_trait]
pub trait MessageSource: Send {
    async fn recv(&mut self) -> Result<Option<Message>, ChannelError>;
}

pub mod framing;
pub mod in_memory;
pub mod tcp;
