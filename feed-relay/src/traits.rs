use crate::types::{ParsedFeed, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can turn a feed URL into parsed items.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`, newest items first as published.
    async fn fetch(&self, url: &str) -> Result<ParsedFeed>;
}

/// Outcome of one sweep over every source of a poller's kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sources_checked: usize,
    pub sources_failed: usize,
    pub new_items: usize,
    pub notifications_sent: usize,
}

/// A periodic job driven by a `RecurringTask`.
#[async_trait]
pub trait PollJob: Send + Sync {
    fn name(&self) -> &'static str;

    /// Period between the end of one cycle and the start of the next.
    fn interval(&self) -> Duration;

    /// Run one full sweep. Per-source failures are absorbed into the report.
    async fn run_cycle(&self) -> CycleReport;
}
