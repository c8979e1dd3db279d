use std::sync::Arc;

use async_trait::async_trait;

use maimai_core::error::Result;
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::room::Room;
use crate::store::MsgLogRecord;

/// Records every message, including the bot's own replies.
#[derive(Default)]
pub struct MessageLog;

impl MessageLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for MessageLog {
    fn name(&self) -> &'static str {
        "message-log"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent) || packet.is(PacketType::SendReply)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        if packet.error.is_some() && packet.data.is_none() {
            // Rejected send; nothing to log.
            return Ok(());
        }
        let msg = packet.as_message()?;
        let (id, record) = MsgLogRecord::from_message(&msg);
        room.store_log(&id, record).await
    }
}
