use crate::types::{FeedItem, ParsedFeed, RelayError, Result};
use chrono::SecondsFormat;
use feed_rs::parser;
use tracing::debug;

const YOUTUBE_VIDEO_ID_PREFIX: &str = "yt:video:";

/// Turns raw RSS/Atom documents into `FeedItem`s. Everything downstream works
/// with the normalized struct and never touches feed-rs types.
pub struct FeedParser;

impl FeedParser {
    pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| RelayError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());

        let items: Vec<FeedItem> = feed.entries.into_iter().map(Self::parse_entry).collect();

        debug!("Parsed feed with {} entries", items.len());

        Ok(ParsedFeed { title, items })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> FeedItem {
        let title = entry.title.map(|t| t.content).unwrap_or_default();

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .filter(|s| !s.is_empty());

        let published = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true));

        let video_id = entry
            .id
            .strip_prefix(YOUTUBE_VIDEO_ID_PREFIX)
            .map(|id| id.to_string())
            .filter(|id| !id.is_empty());

        let thumbnail_url = entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .next();

        FeedItem {
            title,
            link,
            summary,
            published,
            video_id,
            thumbnail_url,
        }
    }
}
