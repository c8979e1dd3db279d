use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use maimai_core::error::Result;
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::room::Room;
use crate::store::normalize_user;

use super::commands::seen_target;

/// Records "now" for the sender of every message.
#[derive(Default)]
pub struct SeenRecord;

impl SeenRecord {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for SeenRecord {
    fn name(&self) -> &'static str {
        "seen-record"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        let msg = packet.as_message()?;
        let user = normalize_user(&msg.sender.name);
        if user.is_empty() {
            return Ok(());
        }
        room.store_seen(&user, Utc::now().timestamp()).await
    }
}

/// `!seen @user` -> hours since the user last spoke.
#[derive(Default)]
pub struct SeenCommand;

impl SeenCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for SeenCommand {
    fn name(&self) -> &'static str {
        "seen-command"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        let msg = packet.as_message()?;
        let Some(target) = seen_target(&msg.content) else {
            return Ok(());
        };

        let reply = match room.retrieve_seen(&normalize_user(target)).await? {
            Some(at) => {
                let hours = (Utc::now().timestamp() - at).max(0) / 3600;
                format!("Seen {hours} hours ago.")
            }
            None => "User has not been seen yet.".to_string(),
        };
        room.send_text(&reply, &msg.id)
    }
}
