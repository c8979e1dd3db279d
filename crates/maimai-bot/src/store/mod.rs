//! Storage collaborators consumed by the handlers.
//!
//! The engines behind these traits are not the bot's business; the bundled
//! implementations are in-memory and live for one process.

mod memory;

use async_trait::async_trait;
use serde::Serialize;

use maimai_core::error::Result;
use maimai_core::protocol::Message;

pub use memory::{MemoryMessageLog, MemorySeenStore};

/// Last-seen timestamps keyed by normalized username.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn store(&self, user: &str, unix_time: i64) -> Result<()>;
    /// `Ok(None)` means "never seen", which is not an error.
    async fn retrieve(&self, user: &str) -> Result<Option<i64>>;
}

/// Message log keyed by message id.
#[async_trait]
pub trait MessageLogStore: Send + Sync {
    async fn store(&self, message_id: &str, record: MsgLogRecord) -> Result<()>;
}

/// One logged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgLogRecord {
    pub parent: String,
    pub user_id: String,
    pub user_name: String,
    pub time: i64,
    pub content: String,
}

impl MsgLogRecord {
    /// Split a message into its id and the record stored under it.
    pub fn from_message(msg: &Message) -> (String, Self) {
        let record = Self {
            parent: msg.parent.clone(),
            user_id: msg.sender.id.clone(),
            user_name: msg.sender.name.clone(),
            time: msg.time,
            content: msg.content.clone(),
        };
        (msg.id.clone(), record)
    }
}

/// Seen-store key for a display name: spaces are dropped so `!seen @JohnDoe`
/// finds "John Doe".
pub fn normalize_user(name: &str) -> String {
    name.chars().filter(|c| *c != ' ').collect()
}
