use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use maimai_core::error::{MaimaiError, Result};
use maimai_core::protocol::{Packet, PacketType};

use crate::dispatch::Handler;
use crate::room::Room;
use crate::title::TitleFetcher;

const LINK_PATTERN: &str = r"(https?://)?[\S]+\.[\S][\S]+[\S^\.]";

/// URL-looking substrings of `content`, scheme added where missing.
pub fn link_candidates(matcher: &Regex, content: &str) -> Vec<String> {
    matcher
        .find_iter(content)
        .map(|m| {
            let url = m.as_str();
            if url.starts_with("http") {
                url.to_string()
            } else {
                format!("http://{url}")
            }
        })
        .collect()
}

/// Replies with the title of the first link in a message that has one.
pub struct LinkTitle {
    matcher: Regex,
    titles: Arc<dyn TitleFetcher>,
}

impl LinkTitle {
    pub fn new(titles: Arc<dyn TitleFetcher>) -> Result<Self> {
        let matcher = Regex::new(LINK_PATTERN)
            .map_err(|e| MaimaiError::Config(format!("link pattern: {e}")))?;
        Ok(Self { matcher, titles })
    }
}

#[async_trait]
impl Handler for LinkTitle {
    fn name(&self) -> &'static str {
        "link-title"
    }

    fn wants(&self, packet: &Packet) -> bool {
        packet.is(PacketType::SendEvent)
    }

    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()> {
        let msg = packet.as_message()?;

        for url in link_candidates(&self.matcher, &msg.content) {
            match self.titles.fetch_title(&url).await {
                Ok(Some(title)) => {
                    room.send_text(&format!("Link title: {title}"), &msg.id)?;
                    break;
                }
                Ok(None) => tracing::debug!(%url, "no usable title"),
                Err(e) => tracing::debug!(%url, error = %e, "title fetch failed"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> Regex {
        Regex::new(LINK_PATTERN).unwrap()
    }

    #[test]
    fn finds_links_with_and_without_scheme() {
        let found = link_candidates(&matcher(), "look at example.com and https://rust-lang.org/learn ok");
        assert_eq!(found, vec!["http://example.com", "https://rust-lang.org/learn"]);
    }

    #[test]
    fn plain_text_has_no_links() {
        assert!(link_candidates(&matcher(), "no links here at all").is_empty());
    }
}
