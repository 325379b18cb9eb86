use crate::parser::FeedParser;
use crate::traits::FeedSource;
use crate::types::{FetchConfig, ParsedFeed, RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// HTTP side of the feed fetcher. No retries: a failed fetch is reported to
/// the caller, which skips the source until its next cycle.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Download the raw feed document.
    pub async fn fetch_content(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(RelayError::Fetch(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let max_bytes = self.config.max_feed_size_mb * 1024 * 1024;
        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_bytes {
                return Err(RelayError::Fetch(format!(
                    "Feed too large: {}MB",
                    content_length as usize / (1024 * 1024)
                )));
            }
        }

        let content = response.text().await?;
        if content.len() > max_bytes {
            return Err(RelayError::Fetch(format!(
                "Feed too large: {}MB",
                content.len() / (1024 * 1024)
            )));
        }

        debug!(
            "Fetched feed: {} ({} bytes in {}ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }

    /// The configured client, shared with the notifier so both honour the
    /// same timeout.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Download and parse, newest items first as the feed orders them.
    pub async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed> {
        let content = self.fetch_content(url).await?;
        tokio::task::spawn_blocking(move || FeedParser::parse_feed(&content))
            .await
            .map_err(|e| RelayError::Parse(format!("Feed parser task failed: {}", e)))?
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl FeedSource for Fetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        self.fetch_feed(url).await
    }
}
