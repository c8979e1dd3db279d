use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use maimai_core::error::Result;
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::room::Room;

/// First whitespace-delimited token of a message, and the rest.
pub fn command_token(content: &str) -> (&str, &str) {
    let content = content.trim_start();
    content
        .split_once(char::is_whitespace)
        .unwrap_or((content, ""))
}

/// `!seen @user` with nothing else; returns `user`.
pub fn seen_target(content: &str) -> Option<&str> {
    let mut parts = content.split_whitespace();
    let (cmd, arg) = (parts.next()?, parts.next()?);
    if cmd != "!seen" || parts.next().is_some() {
        return None;
    }
    arg.strip_prefix('@').filter(|u| !u.is_empty())
}

/// Go-ish compact duration: `3h4m5s`, `4m5s`, `5s`.
pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

/// Reply with a fixed string when a message starts with `trigger` as a whole
/// token.
async fn reply_fixed(room: &Room, packet: &Packet, trigger: &str, reply: &str) -> Result<()> {
    let msg = packet.as_message()?;
    if command_token(&msg.content).0 == trigger {
        room.send_text(reply, &msg.id)?;
    }
    Ok(())
}

/// `!ping` -> `pong!`
#[derive(Default)]
pub struct PingCommand;

impl PingCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for PingCommand {
    fn name(&self) -> &'static str {
        "ping-command"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        reply_fixed(room, packet, "!ping", "pong!").await
    }
}

/// `!scritch` -> `/me bruxes`
#[derive(Default)]
pub struct ScritchCommand;

impl ScritchCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for ScritchCommand {
    fn name(&self) -> &'static str {
        "scritch"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        reply_fixed(room, packet, "!scritch", "/me bruxes").await
    }
}

/// `!uptime` -> time since the room session started.
#[derive(Default)]
pub struct UptimeCommand;

impl UptimeCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for UptimeCommand {
    fn name(&self) -> &'static str {
        "uptime"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        let msg = packet.as_message()?;
        if command_token(&msg.content).0 == "!uptime" {
            let text = format!("This bot has been up for {}.", format_uptime(room.uptime()));
            room.send_text(&text, &msg.id)?;
        }
        Ok(())
    }
}
