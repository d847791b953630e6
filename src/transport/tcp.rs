use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::{framing, ChannelError, MessageSink, MessageSource};

/// Default bound on a single frame write (10 seconds).
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Framed message channel over a TCP stream.
///
/// Receives block until a frame arrives or the stream closes; only sends
/// are time-bounded. Use [`TcpTransport::into_split`] to hand the read half
/// to a background receiver while the main loop keeps the write half.
pub struct TcpTransport {
    stream: TcpStream,
    send_timeout: Duration,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_send_timeout(stream, DEFAULT_SEND_TIMEOUT)
    }

    pub fn with_send_timeout(stream: TcpStream, send_timeout: Duration) -> Self {
        // Frames are tiny and latency matters more than throughput.
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("could not set TCP_NODELAY: {}", e);
        }
        Self {
            stream,
            send_timeout,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ChannelError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> Option<std::net::SocketAddr> {
        self.stream.peer_addr().ok()
    }

    /// Split into independently owned receive and send halves.
    pub fn into_split(self) -> (TcpReceiver, TcpSender) {
        let (read, write) = self.stream.into_split();
        (
            TcpReceiver { read },
            TcpSender {
                write,
                send_timeout: self.send_timeout,
            },
        )
    }
}

#[async_trait::async_trait]
impl MessageSink for TcpTransport {
    async fn send(&mut self, msg: &Message) -> Result<(), ChannelError> {
        let limit = self.send_timeout;
        timeout(limit, framing::send(&mut self.stream, msg))
            .await
            .map_err(|_| ChannelError::Timeout(limit))?
    }
}

#[async_trait::async_trait]
impl MessageSource for TcpTransport {
    async fn recv(&mut self) -> Result<Option<Message>, ChannelError> {
        framing::recv(&mut self.stream).await
    }
}

/// Read half of a split [`TcpTransport`].
pub struct TcpReceiver {
    read: OwnedReadHalf,
}

#[async_trait::async_trait]
impl MessageSource for TcpReceiver {
    async fn recv(&mut self) -> Result<Option<Message>, ChannelError> {
        framing::recv(&mut self.read).await
    }
}

/// Write half of a split [`TcpTransport`].
pub struct TcpSender {
    write: OwnedWriteHalf,
    send_timeout: Duration,
}

#[async_trait::async_trait]
impl MessageSink for TcpSender {
    async fn send(&mut self, msg: &Message) -> Result<(), ChannelError> {
        let limit = self.send_timeout;
        timeout(limit, framing::send(&mut self.write, msg))
            .await
            .map_err(|_| ChannelError::Timeout(limit))?
    }
}
