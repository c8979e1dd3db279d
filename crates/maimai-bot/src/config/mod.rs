//! Bot config loader (strict parsing).

pub mod schema;

use std::fs;

use maimai_core::error::{MaimaiError, Result};

pub use schema::{
    BotConfig, DispatchSection, HandlersSection, LinksSection, PresenceSection, QueuePolicy,
    RoomSection,
};

pub fn load_from_file(path: &str) -> Result<BotConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MaimaiError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BotConfig> {
    let cfg: BotConfig =
        serde_yaml::from_str(s).map_err(|e| MaimaiError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
