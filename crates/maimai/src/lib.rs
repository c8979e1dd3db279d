//! Top-level facade crate for maimai.
//!
//! Re-exports the protocol crate and the bot library so users can depend on a single crate.

pub mod core {
    pub use maimai_core::*;
}

pub mod bot {
    pub use maimai_bot::*;
}
