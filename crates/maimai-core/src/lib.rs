//! maimai core: wire protocol primitives and the shared error type.
//!
//! This crate defines the packet envelope, the closed set of packet tags and
//! the typed payload model spoken with the chat service. It carries no
//! transport or runtime dependencies so the bot, tests and tooling can share
//! it.
//!
//! # Panics
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed or unknown packets surface as `MaimaiError` values so a single
//! bad frame from the server never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{MaimaiError, Result};
pub use protocol::{Packet, PacketType, Payload};
