//! Networked game client.
//!
//! A background task blocks on the transport and queues whatever arrives in
//! an [`Inbox`]. The main loop drains the inbox once per tick, feeds the
//! [`TurnArbiter`], polls the local [`Player`] and transmits the result.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use rand::rngs::SmallRng;
use tokio::net::ToSocketAddrs;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{
    arbiter::{Submitted, TurnArbiter, TurnInput},
    common::{Coord, MoveRecord, RuleError},
    config::GameConfig,
    game::GameOutcome,
    player::{Player, TurnView},
    protocol::Message,
    transport::{tcp::TcpTransport, ChannelError, MessageSink, MessageSource},
};

/// One item delivered by the background receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(Message),
    /// The stream ended cleanly.
    Closed,
    /// Receiving failed; the text is the error.
    Failed(String),
}

pub type Inbox = Arc<Mutex<VecDeque<Inbound>>>;

fn lock(inbox: &Inbox) -> MutexGuard<'_, VecDeque<Inbound>> {
    inbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pump `source` into `inbox` until it ends or fails.
pub fn spawn_receiver<S>(mut source: S, inbox: Inbox) -> JoinHandle<()>
where
    S: MessageSource + 'static,
{
    tokio::spawn(async move {
        loop {
            let item = match source.recv().await {
                Ok(Some(msg)) => {
                    log::debug!("received {}", msg.kind());
                    Inbound::Message(msg)
                }
                Ok(None) => Inbound::Closed,
                Err(e) => Inbound::Failed(e.to_string()),
            };
            let last = !matches!(item, Inbound::Message(_));
            lock(&inbox).push_back(item);
            if last {
                break;
            }
        }
    })
}

pub struct GameClient {
    arbiter: TurnArbiter,
    config: GameConfig,
    inbox: Inbox,
    sink: Box<dyn MessageSink>,
    receiver: JoinHandle<()>,
}

impl GameClient {
    /// Connect to a relay over TCP.
    pub async fn connect<A: ToSocketAddrs>(addr: A, config: GameConfig) -> Result<Self, ChannelError> {
        let transport = TcpTransport::connect(addr).await?;
        if let Some(peer) = transport.peer_addr() {
            log::info!("connected to relay at {}", peer);
        }
        let (source, sink) = transport.into_split();
        Ok(Self::new(source, sink, config))
    }

    /// Build a client over any transport halves. Must be called inside a
    /// tokio runtime.
    pub fn new<S, K>(source: S, sink: K, config: GameConfig) -> Self
    where
        S: MessageSource + 'static,
        K: MessageSink + 'static,
    {
        let inbox = Inbox::default();
        let receiver = spawn_receiver(source, inbox.clone());
        Self {
            arbiter: TurnArbiter::new(&config),
            config,
            inbox,
            sink: Box::new(sink),
            receiver,
        }
    }

    pub fn arbiter(&self) -> &TurnArbiter {
        &self.arbiter
    }

    /// Handle everything that arrived since the last tick, then the turn
    /// timer. Returns `true` once the game is over.
    pub async fn tick(&mut self, now: Instant) -> bool {
        let batch: Vec<Inbound> = lock(&self.inbox).drain(..).collect();
        for item in batch {
            if self.arbiter.is_over() {
                break;
            }
            self.route(item, now);
        }
        if self.arbiter.poll_timeout(now) {
            self.transmit(&Message::Idle).await;
        }
        self.arbiter.is_over()
    }

    fn route(&mut self, item: Inbound, now: Instant) {
        let result = match item {
            Inbound::Message(Message::Welcome { side }) => self.arbiter.welcome(side),
            Inbound::Message(Message::Start { first, seed }) => self.arbiter.start(first, seed, now),
            Inbound::Message(Message::Move {
                from,
                to,
                action,
                defeat,
            }) => {
                let record = MoveRecord {
                    from,
                    to,
                    action,
                    defeat,
                };
                self.arbiter.peer_move(record, now)
            }
            Inbound::Message(Message::Idle) => self.arbiter.peer_idle(now),
            Inbound::Message(Message::PeerDisconnect) => {
                log::info!("relay reports the opponent left");
                self.arbiter.peer_disconnected();
                Ok(())
            }
            Inbound::Closed => {
                log::warn!("connection to relay closed");
                self.arbiter.connection_lost();
                Ok(())
            }
            Inbound::Failed(e) => {
                log::warn!("receive failed: {}", e);
                self.arbiter.connection_lost();
                Ok(())
            }
        };
        if let Err(fault) = result {
            log::warn!("{}", fault);
        }
    }

    /// Pick one of our chips.
    pub fn select(&mut self, at: Coord) -> Result<(), RuleError> {
        self.arbiter.select(at)
    }

    /// Act with the selected chip and send the move.
    pub async fn choose_target(
        &mut self,
        to: Coord,
        now: Instant,
    ) -> Result<MoveRecord, RuleError> {
        let record = self.arbiter.choose_target(to, now)?;
        self.transmit(&Message::from(record)).await;
        Ok(record)
    }

    /// Give up the turn and send `idle`.
    pub async fn pass(&mut self, now: Instant) -> Result<(), RuleError> {
        self.arbiter.pass(now)?;
        self.transmit(&Message::Idle).await;
        Ok(())
    }

    /// Apply a player request and send whatever it produced.
    pub async fn submit(&mut self, input: TurnInput, now: Instant) -> Result<(), RuleError> {
        match self.arbiter.submit(input, now)? {
            Some(Submitted::Move(record)) => self.transmit(&Message::from(record)).await,
            Some(Submitted::Idle) => self.transmit(&Message::Idle).await,
            None => {}
        }
        Ok(())
    }

    async fn transmit(&mut self, msg: &Message) {
        log::debug!("sending {}", msg.kind());
        if let Err(e) = self.sink.send(msg).await {
            log::warn!("sending {} failed: {}", msg.kind(), e);
            self.arbiter.connection_lost();
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
            let over = self.tick(now).await;
            self.notify(player);
            if over {
                break;
            }
            let input = match (self.arbiter.session(), self.arbiter.me()) {
                (Some(session), Some(me)) if self.arbiter.is_my_turn() => {
                    let view = TurnView {
                        session,
                        me,
                        selected: self.arbiter.selected(),
                        time_left: self.arbiter.time_left(now),
                    };
                    player.poll_turn(rng, &view)
                }
                _ => None,
            };
            if let Some(input) = input {
                if let Err(e) = self.submit(input, now).await {
                    player.on_rejected(&input, &e);
                }
                self.notify(player);
            }
            if self.arbiter.is_over() {
                break;
            }
        }
        self.receiver.abort();
        self.arbiter
            .outcome()
            .ok_or_else(|| anyhow::anyhow!("game loop ended without an outcome"))
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}
