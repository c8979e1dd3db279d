//! Shared fixtures for the bot integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use maimai_bot::room::{Room, Stores};
use maimai_bot::store::{MemoryMessageLog, MemorySeenStore, SeenStore};
use maimai_bot::title::TitleFetcher;
use maimai_bot::transport::{self, OutboxRx};
use maimai_core::error::{MaimaiError, Result};
use maimai_core::protocol::{
    Message, NickEvent, Packet, PacketType, PingEvent, PresenceEvent, SendCommand, User,
};

pub struct Harness {
    pub room: Arc<Room>,
    pub sent: OutboxRx,
    pub errors: mpsc::UnboundedReceiver<MaimaiError>,
    pub seen: Arc<MemorySeenStore>,
    pub log: Arc<MemoryMessageLog>,
}

impl Harness {
    pub fn new() -> Self {
        let seen = Arc::new(MemorySeenStore::new());
        Self::with_seen_store(seen.clone(), seen)
    }

    /// Use `store` as the room's seen store; `seen` is kept for inspection.
    pub fn with_seen_store(store: Arc<dyn SeenStore>, seen: Arc<MemorySeenStore>) -> Self {
        let (outbox, sent) = transport::outbox();
        let (err_tx, errors) = mpsc::unbounded_channel();
        let log = Arc::new(MemoryMessageLog::new());
        let room = Arc::new(Room::new(
            "test",
            outbox,
            Stores {
                seen: store,
                log: log.clone(),
            },
            err_tx,
        ));
        Self {
            room,
            sent,
            errors,
            seen,
            log,
        }
    }

    /// Every `send` packet queued so far, as (content, parent).
    pub fn texts(&mut self) -> Vec<(String, String)> {
        drain_texts(&mut self.sent)
    }

    pub fn packets(&mut self) -> Vec<Packet> {
        let mut out = Vec::new();
        while let Ok(p) = self.sent.try_recv() {
            out.push(p);
        }
        out
    }
}

pub fn drain_texts(sent: &mut OutboxRx) -> Vec<(String, String)> {
    let mut out = Vec::new();
    while let Ok(p) = sent.try_recv() {
        if p.is(PacketType::Send) {
            let raw = p.data.as_ref().unwrap().get();
            let cmd: SendCommand = serde_json::from_str(raw).unwrap();
            out.push((cmd.content, cmd.parent));
        }
    }
    out
}

pub fn contents(texts: &[(String, String)]) -> Vec<&str> {
    texts.iter().map(|(c, _)| c.as_str()).collect()
}

fn user(name: &str) -> User {
    User {
        id: format!("agent:{name}"),
        name: name.to_string(),
        server_id: "heim.1".into(),
        server_era: "era".into(),
    }
}

pub fn send_event(id: &str, sender: &str, content: &str) -> Packet {
    let msg = Message {
        id: id.to_string(),
        parent: String::new(),
        previous_edit_id: None,
        time: 1_700_000_000,
        sender: user(sender),
        content: content.to_string(),
        encryption_key_id: None,
        edited: None,
        deleted: None,
    };
    Packet::new("", PacketType::SendEvent, &msg).unwrap()
}

pub fn presence(kind: PacketType, name: &str) -> Packet {
    let ev = PresenceEvent {
        user: user(name),
        session_id: format!("session-{name}"),
    };
    Packet::new("", kind, &ev).unwrap()
}

pub fn join_event(name: &str) -> Packet {
    presence(PacketType::JoinEvent, name)
}

pub fn part_event(name: &str) -> Packet {
    presence(PacketType::PartEvent, name)
}

pub fn nick_event(from: &str, to: &str) -> Packet {
    let ev = NickEvent {
        session_id: "session-x".into(),
        id: "agent:x".into(),
        from: from.to_string(),
        to: to.to_string(),
    };
    Packet::new("", PacketType::NickEvent, &ev).unwrap()
}

pub fn ping_event(time: i64) -> Packet {
    Packet::new("", PacketType::PingEvent, &PingEvent { time, next: time + 30 }).unwrap()
}

/// Let every runnable task finish its current work. Under a paused clock this
/// also advances time by `d`.
pub async fn settle(d: Duration) {
    tokio::time::sleep(d).await;
}

/// Canned titles by URL; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct StaticTitles {
    pub titles: HashMap<String, Option<String>>,
}

impl StaticTitles {
    pub fn with(mut self, url: &str, title: Option<&str>) -> Self {
        self.titles.insert(url.to_string(), title.map(str::to_string));
        self
    }
}

#[async_trait]
impl TitleFetcher for StaticTitles {
    async fn fetch_title(&self, url: &str) -> Result<Option<String>> {
        self.titles
            .get(url)
            .cloned()
            .ok_or_else(|| MaimaiError::Transport(format!("unreachable: {url}")))
    }
}

/// Seen store whose writes always fail.
pub struct BrokenSeenStore;

#[async_trait]
impl SeenStore for BrokenSeenStore {
    async fn store(&self, _user: &str, _unix_time: i64) -> Result<()> {
        Err(MaimaiError::Storage("disk on fire".into()))
    }

    async fn retrieve(&self, _user: &str) -> Result<Option<i64>> {
        Err(MaimaiError::Storage("disk on fire".into()))
    }
}
