//! maimai bot library entry.
//!
//! This crate wires the room, dispatcher, handler tasks, presence debounce
//! and collaborators (stores, title fetcher, transport) into one session. It
//! is consumed by the binary (`main.rs`) and by integration tests.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod presence;
pub mod room;
pub mod session;
pub mod store;
pub mod title;
pub mod transport;
