use serde::{Deserialize, Serialize};
use std::fmt;

pub use interfaces::{DeliveryError, Notification, NotificationKind, Notifier};

pub const YOUTUBE_FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml?channel_id=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Article,
    Channel,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Article => write!(f, "article"),
            SourceKind::Channel => write!(f, "channel"),
        }
    }
}

/// A monitored origin. The key is the feed URL for article feeds and the
/// channel id for upload channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    ArticleFeed { url: String },
    ChannelFeed { channel_id: String },
}

impl Source {
    pub fn article(url: impl Into<String>) -> Self {
        Source::ArticleFeed { url: url.into() }
    }

    pub fn channel(channel_id: impl Into<String>) -> Self {
        Source::ChannelFeed {
            channel_id: channel_id.into(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Source::ArticleFeed { .. } => SourceKind::Article,
            Source::ChannelFeed { .. } => SourceKind::Channel,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Source::ArticleFeed { url } => url,
            Source::ChannelFeed { channel_id } => channel_id,
        }
    }

    pub fn feed_url(&self) -> String {
        match self {
            Source::ArticleFeed { url } => url.clone(),
            Source::ChannelFeed { channel_id } => format!("{}{}", YOUTUBE_FEED_BASE, channel_id),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.key())
    }
}

/// One entry of a fetched feed, normalized at the parse boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub video_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Feed-Relay/0.1".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid source: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Console error: {0}")]
    Console(String),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Fetch(e.to_string())
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
