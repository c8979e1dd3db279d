//! Reaction handlers plugged into the dispatcher.
//!
//! Each one is a thin policy over the `Handler` contract: filter by packet
//! type, react, call back into the room.

mod commands;
mod debug;
mod links;
mod log;
mod ping;
mod presence;
mod seen;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use maimai_core::error::Result;

use crate::config::BotConfig;
use crate::dispatch::Handler;
use crate::presence::PartDebouncer;
use crate::title::TitleFetcher;

pub use commands::{command_token, format_uptime, seen_target, PingCommand, ScritchCommand, UptimeCommand};
pub use debug::DebugLog;
pub use links::{link_candidates, LinkTitle};
pub use log::MessageLog;
pub use ping::PingEventHandler;
pub use presence::{NickChange, PresenceTracker};
pub use seen::{SeenCommand, SeenRecord};

/// Every built-in handler name, in registration order.
pub const HANDLER_NAMES: [&str; 11] = [
    "debug",
    "ping-event",
    "ping-command",
    "scritch",
    "uptime",
    "seen-record",
    "seen-command",
    "link-title",
    "nick-change",
    "presence",
    "message-log",
];

/// Build the enabled handlers. `kill` is handed to the part debouncer when
/// pending leave confirmations should die with the session.
pub fn build(
    cfg: &BotConfig,
    titles: Arc<dyn TitleFetcher>,
    kill: &CancellationToken,
) -> Result<Vec<Arc<dyn Handler>>> {
    let debouncer = PartDebouncer::new(
        Duration::from_secs(cfg.presence.part_delay_secs),
        cfg.presence.cancel_on_shutdown.then(|| kill.clone()),
    );

    let all: Vec<Arc<dyn Handler>> = vec![
        Arc::new(DebugLog::new()),
        Arc::new(PingEventHandler::new()),
        Arc::new(PingCommand::new()),
        Arc::new(ScritchCommand::new()),
        Arc::new(UptimeCommand::new()),
        Arc::new(SeenRecord::new()),
        Arc::new(SeenCommand::new()),
        Arc::new(LinkTitle::new(titles)?),
        Arc::new(NickChange::new()),
        Arc::new(PresenceTracker::new(debouncer)),
        Arc::new(MessageLog::new()),
    ];

    Ok(all
        .into_iter()
        .filter(|h| {
            let on = cfg.handlers.is_enabled(h.name());
            if !on {
                tracing::info!(handler = h.name(), "handler disabled by config");
            }
            on
        })
        .collect())
}
