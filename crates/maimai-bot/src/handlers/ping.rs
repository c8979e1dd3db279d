use std::sync::Arc;

use async_trait::async_trait;

use maimai_core::error::Result;
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::room::Room;

/// Keepalive: answer every `ping-event` with a `ping-reply`.
#[derive(Default)]
pub struct PingEventHandler;

impl PingEventHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for PingEventHandler {
    fn name(&self) -> &'static str {
        "ping-event"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::PingEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        let ping = packet.as_ping_event()?;
        room.send_ping(ping.time)
    }
}
