//! Protocol modules (envelope + payload variants).
//!
//! - `packet`: the JSON envelope with the type tag and lazily decoded `data`.
//! - `payload`: the typed payload shapes and the `Payload` sum type.
//!
//! Decoding is panic-free: unknown tags and shape mismatches are reported as
//! `MaimaiError` so a handler can skip or escalate instead of acting on a
//! zero-valued struct.

pub mod packet;
pub mod payload;

pub use packet::{Packet, PacketType};
pub use payload::{
    AuthCommand, BounceEvent, Message, NickCommand, NickEvent, Payload, PingEvent, PingReply,
    PresenceEvent, SendCommand, User,
};
