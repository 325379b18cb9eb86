use crate::dedup::{fingerprint, ArticleDedup, ChannelDedup};
use crate::registry::SourceRegistry;
use crate::relevance::RelevanceFilter;
use crate::rss_utils::feed::{clean_html, take_chars, truncate_with_ellipsis};
use crate::rss_utils::url::extract_domain;
use crate::traits::{CycleReport, FeedSource, PollJob};
use crate::types::{
    FeedItem, Notification, NotificationKind, Notifier, RelayError, Result, Source, SourceKind,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const DEFAULT_PACING: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_ITEMS: usize = 10;
const SUMMARY_MAX_CHARS: usize = 300;
const PUBLISHED_MAX_CHARS: usize = 25;

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
    /// Pause after each source, whatever its outcome.
    pub pacing: Duration,
    /// Articles considered per feed, newest first. Uploads always look at
    /// the newest entry only.
    pub max_items: usize,
}

impl PollerSettings {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pacing: DEFAULT_PACING,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SourceOutcome {
    new_items: usize,
    notifications_sent: usize,
}

/// What both pollers share: walk every source of one kind, isolate failures,
/// pace between sources.
#[async_trait]
trait SweepPolicy: Send + Sync {
    fn label(&self) -> &'static str;
    fn kind(&self) -> SourceKind;
    fn registry(&self) -> &SourceRegistry;
    fn pacing(&self) -> Duration;
    async fn check_source(&self, source: &Source) -> Result<SourceOutcome>;
}

async fn sweep<P: SweepPolicy + ?Sized>(policy: &P) -> CycleReport {
    let sources = policy.registry().sources_of_kind(policy.kind()).await;
    let mut report = CycleReport::default();

    debug!("{} sweep over {} sources", policy.label(), sources.len());

    for source in &sources {
        report.sources_checked += 1;
        match policy.check_source(source).await {
            Ok(outcome) => {
                report.new_items += outcome.new_items;
                report.notifications_sent += outcome.notifications_sent;
            }
            Err(RelayError::Parse(e)) => {
                report.sources_failed += 1;
                warn!("Error parsing feed for {}: {}", source, e);
            }
            Err(e) => {
                report.sources_failed += 1;
                error!("Error checking {}: {}", source, e);
            }
        }

        if !policy.pacing().is_zero() {
            tokio::time::sleep(policy.pacing()).await;
        }
    }

    report
}

async fn deliver(notifier: &dyn Notifier, notification: &Notification) -> bool {
    match notifier.notify(notification).await {
        Ok(()) => {
            info!("Posted {:?}: {} from {}", notification.kind, notification.title, notification.source_name);
            true
        }
        Err(e) => {
            // Already marked seen; this item will not be retried.
            error!("Could not deliver '{}' via {}: {}", notification.title, notifier.name(), e);
            false
        }
    }
}

struct ArticleState {
    seen: ArticleDedup,
    initialized: bool,
}

/// Polls article feeds. The first sweep only records what is already out
/// there; from the second sweep on, new relevant articles are announced.
pub struct ArticlePoller {
    registry: Arc<SourceRegistry>,
    feeds: Arc<dyn FeedSource>,
    notifier: Arc<dyn Notifier>,
    relevance: RelevanceFilter,
    settings: PollerSettings,
    state: Mutex<ArticleState>,
}

impl ArticlePoller {
    pub fn new(
        registry: Arc<SourceRegistry>,
        feeds: Arc<dyn FeedSource>,
        notifier: Arc<dyn Notifier>,
        relevance: RelevanceFilter,
        settings: PollerSettings,
    ) -> Self {
        Self {
            registry,
            feeds,
            notifier,
            relevance,
            settings,
            state: Mutex::new(ArticleState {
                seen: ArticleDedup::new(),
                initialized: false,
            }),
        }
    }

    pub async fn is_warm(&self) -> bool {
        self.state.lock().await.initialized
    }

    pub async fn articles_tracked(&self) -> usize {
        self.state.lock().await.seen.len()
    }

    /// Dedup and filter one feed's items. Returns the notifications to send;
    /// every new item is recorded whether or not it is announced.
    async fn select_new(&self, source_name: &str, items: &[FeedItem]) -> (usize, Vec<Notification>) {
        let mut state = self.state.lock().await;
        let mut new_items = 0;
        let mut outgoing = Vec::new();

        for item in items.iter().take(self.settings.max_items) {
            let id = fingerprint(item);
            if state.seen.has_seen(&id) {
                continue;
            }
            state.seen.mark_seen(id);
            new_items += 1;

            if !state.initialized {
                continue;
            }

            if self
                .relevance
                .is_relevant(&item.title, item.summary.as_deref().unwrap_or(""))
            {
                outgoing.push(article_notification(item, source_name));
            }
        }

        (new_items, outgoing)
    }
}

pub fn article_notification(item: &FeedItem, source_name: &str) -> Notification {
    let summary = item
        .summary
        .as_deref()
        .unwrap_or("No summary available.");
    let summary = clean_html(&truncate_with_ellipsis(summary, SUMMARY_MAX_CHARS));

    Notification {
        kind: NotificationKind::Article,
        title: non_empty_or(&item.title, "Unknown Title"),
        link: item.link.clone(),
        summary: Some(summary),
        source_name: source_name.to_string(),
        published: item
            .published
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| take_chars(p, PUBLISHED_MAX_CHARS)),
        thumbnail: None,
    }
}

#[async_trait]
impl SweepPolicy for ArticlePoller {
    fn label(&self) -> &'static str {
        "News"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Article
    }

    fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    fn pacing(&self) -> Duration {
        self.settings.pacing
    }

    async fn check_source(&self, source: &Source) -> Result<SourceOutcome> {
        let feed = self.feeds.fetch(&source.feed_url()).await?;
        // Untitled feeds are named after their host.
        let source_name = feed
            .title
            .clone()
            .or_else(|| extract_domain(source.key()))
            .unwrap_or_else(|| "Unknown Source".to_string());
        let (new_items, outgoing) = self.select_new(&source_name, &feed.items).await;

        let mut notifications_sent = 0;
        for notification in &outgoing {
            if deliver(self.notifier.as_ref(), notification).await {
                notifications_sent += 1;
            }
        }

        Ok(SourceOutcome {
            new_items,
            notifications_sent,
        })
    }
}

#[async_trait]
impl PollJob for ArticlePoller {
    fn name(&self) -> &'static str {
        "news_feed"
    }

    fn interval(&self) -> Duration {
        self.settings.interval
    }

    async fn run_cycle(&self) -> CycleReport {
        let report = sweep(self).await;

        let mut state = self.state.lock().await;
        if !state.initialized {
            state.initialized = true;
            info!(
                "News feed monitoring initialized with {} articles tracked",
                state.seen.len()
            );
        }

        report
    }
}

/// Polls channel upload feeds. Only the newest upload matters: a channel's
/// first observation is recorded silently, later changes are announced.
pub struct UploadPoller {
    registry: Arc<SourceRegistry>,
    feeds: Arc<dyn FeedSource>,
    notifier: Arc<dyn Notifier>,
    settings: PollerSettings,
    last_seen: Mutex<ChannelDedup>,
}

impl UploadPoller {
    pub fn new(
        registry: Arc<SourceRegistry>,
        feeds: Arc<dyn FeedSource>,
        notifier: Arc<dyn Notifier>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            registry,
            feeds,
            notifier,
            settings,
            last_seen: Mutex::new(ChannelDedup::new()),
        }
    }

    pub async fn videos_tracked(&self) -> usize {
        self.last_seen.lock().await.len()
    }

    pub async fn last_video(&self, channel_id: &str) -> Option<String> {
        self.last_seen
            .lock()
            .await
            .get_last(channel_id)
            .map(str::to_string)
    }
}

#[async_trait]
impl SweepPolicy for UploadPoller {
    fn label(&self) -> &'static str {
        "YouTube"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Channel
    }

    fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    fn pacing(&self) -> Duration {
        self.settings.pacing
    }

    async fn check_source(&self, source: &Source) -> Result<SourceOutcome> {
        let feed = self.feeds.fetch(&source.feed_url()).await?;
        let channel_id = source.key();

        let Some(latest) = feed.items.first() else {
            return Ok(SourceOutcome::default());
        };
        let Some(video_id) = latest.video_id.as_deref() else {
            debug!("Newest entry for channel {} has no video id", channel_id);
            return Ok(SourceOutcome::default());
        };

        {
            let mut last_seen = self.last_seen.lock().await;
            match last_seen.get_last(channel_id) {
                None => {
                    last_seen.set_last(channel_id, video_id);
                    info!(
                        "Initialized tracking for channel {}, latest video: {}",
                        channel_id, video_id
                    );
                    return Ok(SourceOutcome::default());
                }
                Some(last) if last == video_id => return Ok(SourceOutcome::default()),
                Some(_) => last_seen.set_last(channel_id, video_id),
            }
        }

        let notification = Notification {
            kind: NotificationKind::Upload,
            title: non_empty_or(&latest.title, "Unknown Title"),
            link: latest.link.clone(),
            summary: None,
            source_name: feed.title.clone().unwrap_or_else(|| "Unknown Channel".to_string()),
            published: latest.published.clone(),
            thumbnail: latest.thumbnail_url.clone(),
        };

        let sent = deliver(self.notifier.as_ref(), &notification).await;
        Ok(SourceOutcome {
            new_items: 1,
            notifications_sent: usize::from(sent),
        })
    }
}

#[async_trait]
impl PollJob for UploadPoller {
    fn name(&self) -> &'static str {
        "youtube_feed"
    }

    fn interval(&self) -> Duration {
        self.settings.interval
    }

    async fn run_cycle(&self) -> CycleReport {
        sweep(self).await
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
