use std::sync::Arc;

use async_trait::async_trait;

use maimai_core::error::Result;
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::presence::{joined_text, on_join, JoinOutcome, PartDebouncer};
use crate::room::Room;

/// Join/part bookkeeping for the room, in arrival order.
///
/// Joins, parts and first nick claims (a `nick-event` with an empty `from`)
/// all go through this one handler: a part followed at once by a rejoin must
/// mark the leaving-set before the join clears it.
pub struct PresenceTracker {
    debouncer: PartDebouncer,
}

impl PresenceTracker {
    pub fn new(debouncer: PartDebouncer) -> Self {
        Self { debouncer }
    }

    fn arrived(&self, room: &Room, user: &str) -> Result<()> {
        match on_join(room, user) {
            JoinOutcome::Announce => room.send_text(&joined_text(user), ""),
            JoinOutcome::Returned => {
                tracing::debug!(user = %user, "rejoined within window; leave suppressed");
                Ok(())
            }
            JoinOutcome::Ignored => Ok(()),
        }
    }
}

#[async_trait]
impl Handler for PresenceTracker {
    fn name(&self) -> &'static str {
        "presence"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::JoinEvent)
            || packet.is(PacketType::PartEvent)
            || packet.is(PacketType::NickEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        if packet.is(PacketType::PartEvent) {
            let ev = packet.as_presence()?;
            // Detached; the confirmation re-checks state when it fires.
            let _ = self.debouncer.schedule(room, &ev.user.name);
            return Ok(());
        }

        if packet.is(PacketType::JoinEvent) {
            return self.arrived(room, &packet.as_presence()?.user.name);
        }

        let nick = packet.as_nick_event()?;
        if nick.from.is_empty() {
            self.arrived(room, &nick.to)?;
        }
        Ok(())
    }
}

/// Announces renames. First nick claims and nick drops are not renames.
#[derive(Default)]
pub struct NickChange;

impl NickChange {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for NickChange {
    fn name(&self) -> &'static str {
        "nick-change"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::NickEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        let nick = packet.as_nick_event()?;
        if nick.from.is_empty() || nick.to.is_empty() {
            return Ok(());
        }
        room.send_text(&format!("< {} is now known as {}. >", nick.from, nick.to), "")
    }
}
