//! Packet envelope (JSON).
//!
//! `data` is kept as `RawValue` so every handler decodes only the packets it
//! cares about, and only when it cares.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{MaimaiError, Result};
use crate::protocol::payload::{BounceEvent, Message, NickEvent, Payload, PingEvent, PresenceEvent};

/// Closed set of packet tags understood by the bot. The string forms are the
/// wire contract with the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    PingEvent,
    PingReply,
    Send,
    SendEvent,
    SendReply,
    Nick,
    NickReply,
    NickEvent,
    JoinEvent,
    PartEvent,
    Auth,
    BounceEvent,
}

impl PacketType {
    pub const ALL: [PacketType; 12] = [
        PacketType::PingEvent,
        PacketType::PingReply,
        PacketType::Send,
        PacketType::SendEvent,
        PacketType::SendReply,
        PacketType::Nick,
        PacketType::NickReply,
        PacketType::NickEvent,
        PacketType::JoinEvent,
        PacketType::PartEvent,
        PacketType::Auth,
        PacketType::BounceEvent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PacketType::PingEvent => "ping-event",
            PacketType::PingReply => "ping-reply",
            PacketType::Send => "send",
            PacketType::SendEvent => "send-event",
            PacketType::SendReply => "send-reply",
            PacketType::Nick => "nick",
            PacketType::NickReply => "nick-reply",
            PacketType::NickEvent => "nick-event",
            PacketType::JoinEvent => "join-event",
            PacketType::PartEvent => "part-event",
            PacketType::Auth => "auth",
            PacketType::BounceEvent => "bounce-event",
        }
    }

    /// Look up a wire tag. `None` for anything outside the known set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    /// Protocol-assigned id. Server events carry none.
    #[serde(default)]
    pub id: String,
    /// Type tag (field name is `type` in JSON). Kept as a string so unknown
    /// tags survive envelope parsing and fail at payload decode instead.
    #[serde(rename = "type")]
    pub packet_type: String,
    /// Payload, stored as raw JSON (lazy parsing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
    /// Server-side error string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Packet {
    /// Build an outgoing packet, serializing `payload` into `data`.
    pub fn new<T: Serialize>(id: impl Into<String>, kind: PacketType, payload: &T) -> Result<Self> {
        let data = serde_json::value::to_raw_value(payload)
            .map_err(|e| MaimaiError::Serialization(format!("{kind} payload: {e}")))?;
        Ok(Self {
            id: id.into(),
            packet_type: kind.as_str().to_string(),
            data: Some(data),
            error: None,
        })
    }

    /// Build an outgoing packet from an already typed payload.
    pub fn from_payload(id: impl Into<String>, payload: &Payload) -> Result<Self> {
        Self::new(id, payload.packet_type(), payload)
    }

    /// Parse one envelope off the wire.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| MaimaiError::Decode(format!("invalid envelope json: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MaimaiError::Serialization(e.to_string()))
    }

    /// Resolve the type tag.
    pub fn kind(&self) -> Result<PacketType> {
        PacketType::from_tag(&self.packet_type)
            .ok_or_else(|| MaimaiError::UnknownType(self.packet_type.clone()))
    }

    /// Cheap tag check used by handler filters; never decodes `data`.
    pub fn is(&self, kind: PacketType) -> bool {
        self.packet_type == kind.as_str()
    }

    /// Decode `data` into the variant selected by the tag.
    pub fn payload(&self) -> Result<Payload> {
        let kind = self.kind()?;
        let raw = self.data.as_deref().map(RawValue::get).unwrap_or("null");
        Payload::decode(kind, raw)
    }

    pub fn as_message(&self) -> Result<Message> {
        match self.payload()? {
            Payload::SendEvent(m) | Payload::SendReply(m) => Ok(m),
            other => Err(mismatch("message", &other)),
        }
    }

    pub fn as_presence(&self) -> Result<PresenceEvent> {
        match self.payload()? {
            Payload::JoinEvent(p) | Payload::PartEvent(p) => Ok(p),
            other => Err(mismatch("presence-event", &other)),
        }
    }

    pub fn as_nick_event(&self) -> Result<NickEvent> {
        match self.payload()? {
            Payload::NickEvent(n) | Payload::NickReply(n) => Ok(n),
            other => Err(mismatch("nick-event", &other)),
        }
    }

    pub fn as_ping_event(&self) -> Result<PingEvent> {
        match self.payload()? {
            Payload::PingEvent(p) => Ok(p),
            other => Err(mismatch("ping-event", &other)),
        }
    }

    pub fn as_bounce_event(&self) -> Result<BounceEvent> {
        match self.payload()? {
            Payload::BounceEvent(b) => Ok(b),
            other => Err(mismatch("bounce-event", &other)),
        }
    }
}

fn mismatch(expected: &'static str, got: &Payload) -> MaimaiError {
    MaimaiError::PayloadMismatch {
        expected,
        actual: got.variant_name(),
    }
}
