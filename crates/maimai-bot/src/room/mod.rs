//! Room: the shared context every handler receives.
//!
//! Owns the outgoing side of the connection, the uptime origin, the
//! leaving-set and the storage collaborators. One `Room` per connection
//! session; a reconnect builds a fresh one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;

use maimai_core::error::{MaimaiError, Result};
use maimai_core::protocol::{NickCommand, Packet, PacketType, PingReply, SendCommand};

use crate::presence::LeavingSet;
use crate::store::{MessageLogStore, MsgLogRecord, SeenStore};
use crate::transport::Outbox;

/// Storage collaborators handed to the room.
#[derive(Clone)]
pub struct Stores {
    pub seen: Arc<dyn SeenStore>,
    pub log: Arc<dyn MessageLogStore>,
}

pub struct Room {
    name: String,
    outbox: Outbox,
    next_id: AtomicU64,
    started: Instant,
    leaving: LeavingSet,
    stores: Stores,
    errors: mpsc::UnboundedSender<MaimaiError>,
}

impl Room {
    pub fn new(
        name: impl Into<String>,
        outbox: Outbox,
        stores: Stores,
        errors: mpsc::UnboundedSender<MaimaiError>,
    ) -> Self {
        Self {
            name: name.into(),
            outbox,
            next_id: AtomicU64::new(1),
            started: Instant::now(),
            leaving: LeavingSet::new(),
            stores,
            errors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn leaving(&self) -> &LeavingSet {
        &self.leaving
    }

    /// Queue an outgoing packet. Safe to call from any handler concurrently;
    /// the transport writer serializes actual sends.
    pub fn send<T: Serialize>(&self, kind: PacketType, payload: &T) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let packet = Packet::new(id, kind, payload)?;
        self.outbox
            .send(packet)
            .map_err(|_| MaimaiError::Transport("outbound queue closed".into()))
    }

    /// Post `content` to the room, as a reply to `parent` when non-empty.
    pub fn send_text(&self, content: &str, parent: &str) -> Result<()> {
        tracing::debug!(room = %self.name, parent = %parent, "send text");
        self.send(
            PacketType::Send,
            &SendCommand {
                content: content.to_string(),
                parent: parent.to_string(),
            },
        )
    }

    /// Answer a server ping.
    pub fn send_ping(&self, time: i64) -> Result<()> {
        self.send(PacketType::PingReply, &PingReply { time: Some(time) })
    }

    pub fn set_nick(&self, nick: &str) -> Result<()> {
        self.send(
            PacketType::Nick,
            &NickCommand {
                name: nick.to_string(),
            },
        )
    }

    pub async fn store_seen(&self, user: &str, unix_time: i64) -> Result<()> {
        self.stores.seen.store(user, unix_time).await
    }

    pub async fn retrieve_seen(&self, user: &str) -> Result<Option<i64>> {
        self.stores.seen.retrieve(user).await
    }

    pub async fn store_log(&self, message_id: &str, record: MsgLogRecord) -> Result<()> {
        self.stores.log.store(message_id, record).await
    }

    /// Escalate to the supervisor.
    pub fn report(&self, err: MaimaiError) {
        tracing::error!(room = %self.name, code = err.code().as_str(), error = %err, "escalating");
        if self.errors.send(err).is_err() {
            tracing::warn!(room = %self.name, "error channel closed; supervisor gone");
        }
    }
}
