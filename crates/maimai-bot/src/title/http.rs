use std::time::Duration;

use async_trait::async_trait;

use maimai_core::error::{MaimaiError, Result};

use super::{extract_title, TitleFetcher};

/// `reqwest`-backed fetcher. Every request is bounded by the client timeout.
pub struct HttpTitleFetcher {
    client: reqwest::Client,
    ignored_titles: Vec<String>,
}

impl HttpTitleFetcher {
    pub fn new(timeout: Duration, ignored_titles: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("maimai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MaimaiError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            ignored_titles,
        })
    }
}

#[async_trait]
impl TitleFetcher for HttpTitleFetcher {
    async fn fetch_title(&self, url: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MaimaiError::Transport(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(MaimaiError::Transport(format!(
                "GET {url}: bad response code {status}"
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MaimaiError::Transport(format!("GET {url}: body read failed: {e}")))?;

        Ok(extract_title(&body, &self.ignored_titles))
    }
}
