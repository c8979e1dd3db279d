use async_trait::async_trait;
use dashmap::DashMap;

use maimai_core::error::Result;

use super::{MessageLogStore, MsgLogRecord, SeenStore};

/// In-process seen store.
#[derive(Default)]
pub struct MemorySeenStore {
    seen: DashMap<String, i64>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self {
            seen: DashMap::new(),
        }
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn store(&self, user: &str, unix_time: i64) -> Result<()> {
        self.seen.insert(user.to_string(), unix_time);
        Ok(())
    }

    async fn retrieve(&self, user: &str) -> Result<Option<i64>> {
        Ok(self.seen.get(user).map(|t| *t.value()))
    }
}

/// In-process message log.
#[derive(Default)]
pub struct MemoryMessageLog {
    records: DashMap<String, MsgLogRecord>,
}

impl MemoryMessageLog {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn get(&self, message_id: &str) -> Option<MsgLogRecord> {
        self.records.get(message_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl MessageLogStore for MemoryMessageLog {
    async fn store(&self, message_id: &str, record: MsgLogRecord) -> Result<()> {
        // Edits arrive under the same id; the latest version wins.
        self.records.insert(message_id.to_string(), record);
        Ok(())
    }
}
