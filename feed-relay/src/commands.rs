use crate::poller::{ArticlePoller, UploadPoller};
use crate::registry::{AddOutcome, SourceRegistry};
use crate::rss_utils::feed::take_chars;
use crate::rss_utils::time::format_interval;
use crate::traits::PollJob;
use crate::types::{RelayError, Source};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const COMMAND_PREFIX: &str = "!q";

const LISTED_CHANNELS: usize = 10;
const LISTED_FEEDS: usize = 5;
const LISTED_URL_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    News,
    YouTube,
    ListSources,
    AddSourceYoutube(Option<String>),
    AddSourceRss(Option<String>),
}

impl Command {
    /// Parse one line of operator input. Anything that is not a known
    /// prefixed command yields `None` and is ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let body = input.trim().strip_prefix(COMMAND_PREFIX)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match name {
            "help" => Some(Command::Help),
            "status" => Some(Command::Status),
            "news" => Some(Command::News),
            "youtube" => Some(Command::YouTube),
            "list-sources" => Some(Command::ListSources),
            "add-source-youtube" => Some(Command::AddSourceYoutube(arg)),
            "add-source-rss" => Some(Command::AddSourceRss(arg)),
            _ => None,
        }
    }
}

/// A plain-text reply: a heading followed by `name: value` style lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub title: String,
    pub lines: Vec<String>,
}

impl CommandReply {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for line in &self.lines {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerStatus {
    pub sources: usize,
    pub tracked: usize,
    pub interval: Duration,
}

/// Executes operator commands against the registry and both pollers.
#[derive(Clone)]
pub struct CommandHandler {
    registry: Arc<SourceRegistry>,
    news: Arc<ArticlePoller>,
    youtube: Arc<UploadPoller>,
}

impl CommandHandler {
    pub fn new(
        registry: Arc<SourceRegistry>,
        news: Arc<ArticlePoller>,
        youtube: Arc<UploadPoller>,
    ) -> Self {
        Self {
            registry,
            news,
            youtube,
        }
    }

    pub async fn execute(&self, command: Command) -> CommandReply {
        match command {
            Command::Help => help(),
            Command::Status => self.status().await,
            Command::News => self.news_status_reply().await,
            Command::YouTube => self.youtube_status_reply().await,
            Command::ListSources => self.list_sources().await,
            Command::AddSourceYoutube(Some(channel_id)) => self.add_channel(&channel_id).await,
            Command::AddSourceYoutube(None) => usage("add-source-youtube UCxxxxxxxxxxxxxxxxxxxxxx"),
            Command::AddSourceRss(Some(url)) => self.add_feed(&url).await,
            Command::AddSourceRss(None) => usage("add-source-rss https://example.com/feed.xml"),
        }
    }

    /// Parse and execute a raw line; `None` for anything that is not a command.
    pub async fn handle_line(&self, line: &str) -> Option<CommandReply> {
        let command = Command::parse(line)?;
        Some(self.execute(command).await)
    }

    pub async fn news_status(&self) -> PollerStatus {
        PollerStatus {
            sources: self.registry.counts().await.feeds,
            tracked: self.news.articles_tracked().await,
            interval: self.news.interval(),
        }
    }

    pub async fn youtube_status(&self) -> PollerStatus {
        PollerStatus {
            sources: self.registry.counts().await.channels,
            tracked: self.youtube.videos_tracked().await,
            interval: self.youtube.interval(),
        }
    }

    pub async fn add_channel(&self, channel_id: &str) -> CommandReply {
        match self.registry.add(Source::channel(channel_id)).await {
            Ok(AddOutcome::Added { total }) => {
                info!("Added YouTube channel {} via command", channel_id);
                CommandReply::new("✅ YouTube Channel Added")
                    .line(format!("Now monitoring YouTube channel: `{}`", channel_id))
                    .line(format!("Total Channels: {}", total))
                    .line("New videos from this channel will be posted here!")
            }
            Ok(AddOutcome::AlreadyPresent) => CommandReply::new(format!(
                "⚠️ Already monitoring YouTube channel: `{}`",
                channel_id
            )),
            Err(e) => rejection(e),
        }
    }

    pub async fn add_feed(&self, url: &str) -> CommandReply {
        match self.registry.add(Source::article(url)).await {
            Ok(AddOutcome::Added { total }) => {
                info!("Added RSS feed {} via command", url);
                CommandReply::new("✅ RSS Feed Added")
                    .line(format!("Now monitoring RSS feed: `{}`", url))
                    .line(format!("Total Feeds: {}", total))
                    .line("Quantum-related articles from this feed will be posted here!")
            }
            Ok(AddOutcome::AlreadyPresent) => {
                CommandReply::new(format!("⚠️ Already monitoring RSS feed: `{}`", url))
            }
            Err(e) => rejection(e),
        }
    }

    pub async fn list_sources(&self) -> CommandReply {
        list_sources_reply(&self.registry.channels().await, &self.registry.feeds().await)
    }

    async fn news_status_reply(&self) -> CommandReply {
        let status = self.news_status().await;
        CommandReply::new("📰 News Monitoring Status")
            .line(format!("Feeds Monitored: {}", status.sources))
            .line(format!("Check Interval: {}", format_interval(status.interval)))
            .line(format!("Articles Tracked: {}", status.tracked))
    }

    async fn youtube_status_reply(&self) -> CommandReply {
        let status = self.youtube_status().await;
        CommandReply::new("📺 YouTube Monitoring Status")
            .line(format!("Channels Monitored: {}", status.sources))
            .line(format!("Check Interval: {}", format_interval(status.interval)))
            .line(format!("Videos Tracked: {}", status.tracked))
    }

    async fn status(&self) -> CommandReply {
        let news = self.news_status().await;
        let youtube = self.youtube_status().await;
        let warm = if self.news.is_warm().await { "warm" } else { "warming up" };

        CommandReply::new("🔮 Qurrent Events Bot Status")
            .line(format!("YouTube: ✅ Monitoring {} channels", youtube.sources))
            .line(format!("News: ✅ Monitoring {} feeds ({})", news.sources, warm))
    }
}

/// Render the source listing with the same limits the chat embed uses.
pub fn list_sources_reply(channels: &[String], feeds: &[String]) -> CommandReply {
    let mut reply = CommandReply::new("📋 Monitored Sources");

    reply = reply.line(format!("🎬 YouTube Channels ({})", channels.len()));
    if channels.is_empty() {
        reply = reply.line("None");
    }
    for channel in channels.iter().take(LISTED_CHANNELS) {
        reply = reply.line(format!("• `{}`", channel));
    }
    if channels.len() > LISTED_CHANNELS {
        reply = reply.line(format!("... and {} more", channels.len() - LISTED_CHANNELS));
    }

    reply = reply.line(format!("📰 RSS Feeds ({})", feeds.len()));
    if feeds.is_empty() {
        reply = reply.line("None");
    }
    for feed in feeds.iter().take(LISTED_FEEDS) {
        let shown = if feed.chars().count() > LISTED_URL_CHARS {
            format!("{}...", take_chars(feed, LISTED_URL_CHARS))
        } else {
            feed.clone()
        };
        reply = reply.line(format!("• {}", shown));
    }
    if feeds.len() > LISTED_FEEDS {
        reply = reply.line(format!("... and {} more", feeds.len() - LISTED_FEEDS));
    }

    reply
}

pub fn help() -> CommandReply {
    CommandReply::new("🔮 Qurrent Events Bot")
        .line("Your source for quantum computing news and updates!")
        .line(format!("`{}help` - Show this help message", COMMAND_PREFIX))
        .line(format!("`{}youtube` - Show YouTube monitoring status", COMMAND_PREFIX))
        .line(format!("`{}news` - Show news monitoring status", COMMAND_PREFIX))
        .line(format!("`{}status` - Show overall bot status", COMMAND_PREFIX))
        .line(format!("`{}list-sources` - List all monitored sources", COMMAND_PREFIX))
        .line(format!(
            "`{}add-source-youtube UC1yNl2E66ZzKApQdRuTQ4tw` - Add YouTube channel (use channel ID)",
            COMMAND_PREFIX
        ))
        .line(format!(
            "`{}add-source-rss https://example.com/feed.xml` - Add RSS news feed",
            COMMAND_PREFIX
        ))
}

fn usage(example: &str) -> CommandReply {
    CommandReply::new(format!("❌ Missing argument. Usage: `{}{}`", COMMAND_PREFIX, example))
}

fn rejection(error: RelayError) -> CommandReply {
    match error {
        RelayError::Validation(message) => CommandReply::new(format!("❌ {}", message)),
        other => CommandReply::new(format!("❌ Could not add source: {}", other)),
    }
}
