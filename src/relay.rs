//! Two-seat relay server.
//!
//! The relay pairs the first two connections as sides A and B, hands out a
//! shared seed and starting side, then forwards frames between them without
//! looking at what they say. It keeps no game state: when either side goes
//! away the other gets `peer_disconnect` and the session is over.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::chip::Side;
use crate::config::{DEFAULT_LISTEN_HOST, DEFAULT_PORT};
use crate::protocol::Message;
use crate::transport::framing;

/// How long to wait for the second forwarding task to notice a closed
/// destination before tearing it down.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Insert a `"_from": "A"|"B"` key into every forwarded payload.
    pub tag_origin: bool,
    /// Fixed board seed instead of a random one.
    pub seed: Option<u64>,
    /// Fixed starting side instead of a coin flip.
    pub first: Option<Side>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LISTEN_HOST.to_string(),
            port: DEFAULT_PORT,
            tag_origin: false,
            seed: None,
            first: None,
        }
    }
}

/// Summary of one relayed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub first: Side,
    pub seed: u64,
    /// Frames relayed from each side, indexed by [`Side::index`].
    pub forwarded: [u64; 2],
    /// Side whose connection ended the session.
    pub closed_by: Side,
}

pub struct RelayServer {
    listener: TcpListener,
    config: RelayConfig,
}

impl RelayServer {
    pub async fn bind(config: RelayConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("binding relay to {}:{}", config.host, config.port))?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve a single pairing until one side disconnects.
    pub async fn run(self) -> anyhow::Result<RelayReport> {
        log::info!("relay listening on {}", self.local_addr()?);
        let mut conn_a = self.admit(Side::A).await?;
        let mut conn_b = self.admit(Side::B).await?;

        let (first, seed) = draw_start(&self.config);
        let start = Message::Start { first, seed };
        log::info!("both seats taken; side {} moves first (seed {})", first, seed);
        if let Err(e) = framing::send(&mut conn_a, &start).await {
            let _ = framing::send(&mut conn_b, &Message::PeerDisconnect).await;
            return Err(e).context("sending start to side A");
        }
        if let Err(e) = framing::send(&mut conn_b, &start).await {
            let _ = framing::send(&mut conn_a, &Message::PeerDisconnect).await;
            return Err(e).context("sending start to side B");
        }

        let (a_read, a_write) = conn_a.into_split();
        let (b_read, b_write) = conn_b.into_split();
        let tag = self.config.tag_origin;
        let counts = [Arc::new(AtomicU64::new(0)), Arc::new(AtomicU64::new(0))];
        let mut a_to_b = tokio::spawn(forward(Side::A, a_read, b_write, tag, counts[0].clone()));
        let mut b_to_a = tokio::spawn(forward(Side::B, b_read, a_write, tag, counts[1].clone()));

        let (stop, other) = tokio::select! {
            stop = &mut a_to_b => (stop?, b_to_a),
            stop = &mut b_to_a => (stop?, a_to_b),
        };
        let closed_by = settle(stop, other).await;
        let forwarded = counts.map(|count| count.load(Ordering::Relaxed));
        log::info!(
            "side {} left; relay session closed ({} frames from A, {} from B)",
            closed_by,
            forwarded[0],
            forwarded[1]
        );
        Ok(RelayReport {
            first,
            seed,
            forwarded,
            closed_by,
        })
    }

    async fn admit(&self, side: Side) -> anyhow::Result<TcpStream> {
        log::info!("waiting for side {} to connect...", side);
        let (mut stream, addr) = self.listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("could not set TCP_NODELAY: {}", e);
        }
        log::info!("side {} connected from {}", side, addr);
        framing::send(&mut stream, &Message::Welcome { side })
            .await
            .with_context(|| format!("welcoming side {side}"))?;
        Ok(stream)
    }
}

fn draw_start(config: &RelayConfig) -> (Side, u64) {
    let mut rng = rand::rng();
    let first = config
        .first
        .unwrap_or_else(|| if rng.random_bool(0.5) { Side::A } else { Side::B });
    let seed = config.seed.unwrap_or_else(|| rng.random());
    (first, seed)
}

/// Why a forwarding loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Reading from this side failed or hit end of stream.
    SourceClosed(Side),
    /// Writing to this side failed.
    DestinationClosed(Side),
}

/// Wind down the forwarding task that is still running once `stop` came
/// back from the other one. Returns the side that ended the session.
async fn settle(stop: Stop, mut other: JoinHandle<Stop>) -> Side {
    match stop {
        Stop::SourceClosed(side) => {
            other.abort();
            side
        }
        Stop::DestinationClosed(side) => {
            // The other task reads from the closed side and will notify
            // the survivor itself; give it a moment to do so.
            if timeout(DRAIN_GRACE, &mut other).await.is_err() {
                log::debug!("side {} never closed its read end; aborting", side);
                other.abort();
            }
            side
        }
    }
}

/// Copy frames from `from` to its opponent until either end fails,
/// counting each relayed frame.
async fn forward<R, W>(
    from: Side,
    mut src: R,
    mut dst: W,
    tag_origin: bool,
    count: Arc<AtomicU64>,
) -> Stop
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let to = from.opponent();
    loop {
        let frame = match framing::read_frame(&mut src).await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("side {} closed its connection", from);
                break;
            }
            Err(e) => {
                log::warn!("reading from side {} failed: {}", from, e);
                break;
            }
        };
        let frame = if tag_origin {
            tag_frame(frame, from)
        } else {
            frame
        };
        if let Err(e) = framing::write_frame(&mut dst, &frame).await {
            log::warn!("forwarding to side {} failed: {}", to, e);
            return Stop::DestinationClosed(to);
        }
        count.fetch_add(1, Ordering::Relaxed);
        log::debug!("forwarded {} bytes {} -> {}", frame.len(), from, to);
    }
    if let Err(e) = framing::send(&mut dst, &Message::PeerDisconnect).await {
        log::debug!("could not notify side {} of the disconnect: {}", to, e);
    }
    Stop::SourceClosed(from)
}

/// Add the origin key to a JSON object payload. Anything else passes
/// through untouched.
fn tag_frame(frame: Vec<u8>, from: Side) -> Vec<u8> {
    let Ok(serde_json::Value::Object(mut map)) = serde_json::from_slice(&frame) else {
        return frame;
    };
    map.insert("_from".into(), serde_json::Value::String(from.to_string()));
    serde_json::to_vec(&serde_json::Value::Object(map)).unwrap_or(frame)
}
