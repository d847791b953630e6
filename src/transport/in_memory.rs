use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::protocol::Message;
use crate::transport::{ChannelError, MessageSink, MessageSource};

/// In-process message channel, used to drive clients without sockets.
///
/// Dropping one end's sender makes the other end's `recv` report end of
/// stream, mirroring a closed TCP connection.
pub struct InMemoryTransport {
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
}

impl InMemoryTransport {
    /// Two connected endpoints.
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = unbounded_channel();
        let (tx2, rx2) = unbounded_channel();
        (Self { tx: tx1, rx: rx2 }, Self { tx: tx2, rx: rx1 })
    }

    pub fn into_split(self) -> (InMemoryReceiver, InMemorySender) {
        (InMemoryReceiver { rx: self.rx }, InMemorySender { tx: self.tx })
    }
}

fn push(tx: &UnboundedSender<Message>, msg: &Message) -> Result<(), ChannelError> {
    tx.send(msg.clone()).map_err(|_| {
        ChannelError::Connection(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "in-memory peer dropped",
        ))
    })
}

#[async_trait::async_trait]
impl MessageSink for InMemoryTransport {
    async fn send(&mut self, msg: &Message) -> Result<(), ChannelError> {
        push(&self.tx, msg)
    }
}

#[async_trait::async_trait]
impl MessageSource for InMemoryTransport {
    async fn recv(&mut self) -> Result<Option<Message>, ChannelError> {
        Ok(self.rx.recv().await)
    }
}

pub struct InMemoryReceiver {
    rx: UnboundedReceiver<Message>,
}

#[async_trait::async_trait]
impl MessageSource for InMemoryReceiver {
    async fn recv(&mut self) -> Result<Option<Message>, ChannelError> {
        Ok(self.rx.recv().await)
    }
}

pub struct InMemorySender {
    tx: UnboundedSender<Message>,
}

#[async_trait::async_trait]
impl MessageSink for InMemorySender {
    async fn send(&mut self, msg: &Message) -> Result<(), ChannelError> {
        push(&self.tx, msg)
    }
}
