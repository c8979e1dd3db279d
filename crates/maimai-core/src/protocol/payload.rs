//! Typed payload shapes, one per packet tag.
//!
//! Required fields are required on purpose: a payload missing them is a
//! `MalformedPayload` error rather than a struct full of defaults. Unknown
//! fields are ignored since the service adds fields over time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MaimaiError, Result};
use crate::protocol::packet::PacketType;

/// Server ping; the client answers with a `ping-reply` carrying `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingEvent {
    pub time: i64,
    pub next: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

/// A user in the room. Names may repeat within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub server_era: String,
}

/// A chat message (`send-event` and `send-reply`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_edit_id: Option<String>,
    pub time: i64,
    pub sender: User,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCommand {
    pub content: String,
    #[serde(default)]
    pub parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NickCommand {
    pub name: String,
}

/// Nick change (`nick-event`, `nick-reply`). An empty `from` is a session
/// claiming its first nick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NickEvent {
    pub session_id: String,
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Join/part. The user fields are flattened into the payload on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    #[serde(flatten)]
    pub user: User,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCommand {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BounceEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Decoded payload. The variant is chosen by the packet tag, never guessed
/// from the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    PingEvent(PingEvent),
    PingReply(PingReply),
    Send(SendCommand),
    SendEvent(Message),
    SendReply(Message),
    Nick(NickCommand),
    NickReply(NickEvent),
    NickEvent(NickEvent),
    JoinEvent(PresenceEvent),
    PartEvent(PresenceEvent),
    Auth(AuthCommand),
    BounceEvent(BounceEvent),
}

impl Payload {
    /// Decode raw JSON as the shape selected by `kind`.
    pub fn decode(kind: PacketType, raw: &str) -> Result<Self> {
        Ok(match kind {
            PacketType::PingEvent => Payload::PingEvent(parse(kind, raw)?),
            PacketType::PingReply => Payload::PingReply(parse(kind, raw)?),
            PacketType::Send => Payload::Send(parse(kind, raw)?),
            PacketType::SendEvent => Payload::SendEvent(parse(kind, raw)?),
            PacketType::SendReply => Payload::SendReply(parse(kind, raw)?),
            PacketType::Nick => Payload::Nick(parse(kind, raw)?),
            PacketType::NickReply => Payload::NickReply(parse(kind, raw)?),
            PacketType::NickEvent => Payload::NickEvent(parse(kind, raw)?),
            PacketType::JoinEvent => Payload::JoinEvent(parse(kind, raw)?),
            PacketType::PartEvent => Payload::PartEvent(parse(kind, raw)?),
            PacketType::Auth => Payload::Auth(parse(kind, raw)?),
            PacketType::BounceEvent => Payload::BounceEvent(parse(kind, raw)?),
        })
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Payload::PingEvent(_) => PacketType::PingEvent,
            Payload::PingReply(_) => PacketType::PingReply,
            Payload::Send(_) => PacketType::Send,
            Payload::SendEvent(_) => PacketType::SendEvent,
            Payload::SendReply(_) => PacketType::SendReply,
            Payload::Nick(_) => PacketType::Nick,
            Payload::NickReply(_) => PacketType::NickReply,
            Payload::NickEvent(_) => PacketType::NickEvent,
            Payload::JoinEvent(_) => PacketType::JoinEvent,
            Payload::PartEvent(_) => PacketType::PartEvent,
            Payload::Auth(_) => PacketType::Auth,
            Payload::BounceEvent(_) => PacketType::BounceEvent,
        }
    }

    /// Shape name, used in mismatch errors.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Payload::PingEvent(_) => "ping-event",
            Payload::PingReply(_) => "ping-reply",
            Payload::Send(_) => "send-command",
            Payload::SendEvent(_) | Payload::SendReply(_) => "message",
            Payload::Nick(_) => "nick-command",
            Payload::NickReply(_) | Payload::NickEvent(_) => "nick-event",
            Payload::JoinEvent(_) | Payload::PartEvent(_) => "presence-event",
            Payload::Auth(_) => "auth-command",
            Payload::BounceEvent(_) => "bounce-event",
        }
    }
}

fn parse<T: DeserializeOwned>(kind: PacketType, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::debug!(packet_type = %kind, error = %e, "payload decode failed");
        MaimaiError::MalformedPayload {
            packet_type: kind.as_str(),
            reason: e.to_string(),
        }
    })
}
