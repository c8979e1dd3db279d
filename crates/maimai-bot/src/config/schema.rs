use serde::Deserialize;

use maimai_core::error::{MaimaiError, Result};

use crate::handlers::HANDLER_NAMES;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    pub version: u32,

    pub room: RoomSection,

    #[serde(default)]
    pub dispatch: DispatchSection,

    #[serde(default)]
    pub presence: PresenceSection,

    #[serde(default)]
    pub links: LinksSection,

    #[serde(default)]
    pub handlers: HandlersSection,
}

impl BotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MaimaiError::UnsupportedVersion);
        }

        self.room.validate()?;
        self.dispatch.validate()?;
        self.presence.validate()?;
        self.links.validate()?;
        self.handlers.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomSection {
    pub name: String,

    #[serde(default = "default_nick")]
    pub nick: String,

    /// WebSocket URL; `{room}` is replaced with `name`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl RoomSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MaimaiError::Config("room.name must not be empty".into()));
        }
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(MaimaiError::Config(
                "room.endpoint must be a ws:// or wss:// url".into(),
            ));
        }
        Ok(())
    }

    pub fn url(&self) -> String {
        self.endpoint.replace("{room}", &self.name)
    }
}

fn default_nick() -> String {
    "maimai".into()
}
fn default_endpoint() -> String {
    "wss://euphoria.io/room/{room}/ws".into()
}

/// Per-handler input queue.
///
/// `Unbounded` never blocks the dispatcher; a stuck handler only grows its own
/// backlog. `Bounded` caps memory, at the price that one slow handler stalls
/// delivery to every handler until it catches up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum QueuePolicy {
    #[default]
    Unbounded,
    Bounded { capacity: usize },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    #[serde(default)]
    pub queue: QueuePolicy,
}

impl DispatchSection {
    pub fn validate(&self) -> Result<()> {
        if let QueuePolicy::Bounded { capacity } = self.queue {
            if !(1..=65536).contains(&capacity) {
                return Err(MaimaiError::Config(
                    "dispatch.queue.capacity must be between 1 and 65536".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceSection {
    #[serde(default = "default_part_delay_secs")]
    pub part_delay_secs: u64,

    /// Drop pending leave announcements when the session shuts down.
    #[serde(default = "default_true")]
    pub cancel_on_shutdown: bool,
}

impl Default for PresenceSection {
    fn default() -> Self {
        Self {
            part_delay_secs: default_part_delay_secs(),
            cancel_on_shutdown: true,
        }
    }
}

impl PresenceSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.part_delay_secs) {
            return Err(MaimaiError::Config(
                "presence.part_delay_secs must be between 1 and 3600".into(),
            ));
        }
        Ok(())
    }
}

fn default_part_delay_secs() -> u64 {
    300
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinksSection {
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Titles of placeholder pages that carry no information.
    #[serde(default = "default_ignored_titles")]
    pub ignored_titles: Vec<String>,
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            ignored_titles: default_ignored_titles(),
        }
    }
}

impl LinksSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.fetch_timeout_ms) {
            return Err(MaimaiError::Config(
                "links.fetch_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_fetch_timeout_ms() -> u64 {
    5000
}
fn default_ignored_titles() -> Vec<String> {
    vec!["Imgur".into()]
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlersSection {
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl HandlersSection {
    pub fn validate(&self) -> Result<()> {
        for name in &self.disabled {
            if !HANDLER_NAMES.contains(&name.as_str()) {
                return Err(MaimaiError::Config(format!(
                    "handlers.disabled refers to unknown handler: {name}"
                )));
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.iter().any(|d| d == name)
    }
}
