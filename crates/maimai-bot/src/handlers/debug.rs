use std::sync::Arc;

use async_trait::async_trait;

use maimai_core::error::Result;
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::room::Room;

/// Surfaces server-side errors and bounces in the log. Never fails.
#[derive(Default)]
pub struct DebugLog;

impl DebugLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for DebugLog {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn wants(&self, _packet: &Packet) -> bool {
        true
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        if let Some(err) = &packet.error {
            tracing::error!(room = %room.name(), packet_type = %packet.packet_type, id = %packet.id, error = %err, "packet carries server error");
        }

        if packet.is(PacketType::BounceEvent) {
            match packet.as_bounce_event() {
                Ok(bounce) => tracing::error!(
                    room = %room.name(),
                    id = %packet.id,
                    reason = bounce.reason.as_deref().unwrap_or(""),
                    "bounced"
                ),
                Err(e) => tracing::debug!(error = %e, "undecodable bounce-event"),
            }
        }

        if packet.kind().is_err() {
            tracing::trace!(packet_type = %packet.packet_type, "unhandled packet type");
        }
        Ok(())
    }
}
