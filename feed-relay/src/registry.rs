use crate::rss_utils::url;
use crate::state::{DynamicSources, DynamicSourcesStore};
use crate::types::{RelayError, Result, Source, SourceKind};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The source is now monitored; `total` counts sources of its kind.
    Added { total: usize },
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub channels: usize,
    pub feeds: usize,
}

/// Monitored sources of both kinds.
///
/// Pollers take a snapshot of their kind at the start of each sweep, so a
/// source added mid-sweep is picked up on the next cycle rather than the
/// current one.
pub struct SourceRegistry {
    channels: RwLock<Vec<String>>,
    feeds: RwLock<Vec<String>>,
    dynamic: Mutex<DynamicSources>,
    store: Option<DynamicSourcesStore>,
}

impl SourceRegistry {
    /// Registry that never touches disk.
    pub fn in_memory<C, F>(channels: C, feeds: F) -> Self
    where
        C: IntoIterator<Item = String>,
        F: IntoIterator<Item = String>,
    {
        Self {
            channels: RwLock::new(merge_unique(channels, Vec::new())),
            feeds: RwLock::new(merge_unique(feeds, Vec::new())),
            dynamic: Mutex::new(DynamicSources::default()),
            store: None,
        }
    }

    /// Static configuration merged with whatever was persisted by earlier
    /// runs. Duplicates collapse; static entries keep their order and come
    /// first.
    pub async fn load(
        static_channels: Vec<String>,
        static_feeds: Vec<String>,
        store: DynamicSourcesStore,
    ) -> Self {
        let dynamic = store.load().await;

        let channels = merge_unique(static_channels, dynamic.youtube_channels.clone());
        let feeds = merge_unique(static_feeds, dynamic.rss_feeds.clone());

        info!(
            "Source registry loaded: {} channels, {} feeds ({} channels and {} feeds from {})",
            channels.len(),
            feeds.len(),
            dynamic.youtube_channels.len(),
            dynamic.rss_feeds.len(),
            store.path().display()
        );

        Self {
            channels: RwLock::new(channels),
            feeds: RwLock::new(feeds),
            dynamic: Mutex::new(dynamic),
            store: Some(store),
        }
    }

    pub fn validate(source: &Source) -> Result<()> {
        match source {
            Source::ChannelFeed { channel_id } => {
                if !url::is_valid_channel_id(channel_id) {
                    return Err(RelayError::Validation(format!(
                        "Invalid YouTube channel ID format '{}'. Should be {} characters starting with '{}'",
                        channel_id,
                        url::CHANNEL_ID_LEN,
                        url::CHANNEL_ID_PREFIX
                    )));
                }
            }
            Source::ArticleFeed { url: feed_url } => {
                if !url::is_valid_rss_url(feed_url) {
                    return Err(RelayError::Validation(format!(
                        "Invalid RSS feed URL '{}'. Must start with http:// or https://",
                        feed_url
                    )));
                }
            }
        }
        Ok(())
    }

    /// Start monitoring `source`. An already-monitored key is reported as
    /// such and leaves both memory and disk untouched.
    pub async fn add(&self, source: Source) -> Result<AddOutcome> {
        Self::validate(&source)?;

        let list = self.list_for(source.kind());
        let key = source.key().to_string();

        let total = {
            let mut list = list.write().await;
            if list.contains(&key) {
                return Ok(AddOutcome::AlreadyPresent);
            }
            list.push(key.clone());
            list.len()
        };

        // The guard is held through the write so files land in add order.
        let mut dynamic = self.dynamic.lock().await;
        let persisted = match source.kind() {
            SourceKind::Channel => &mut dynamic.youtube_channels,
            SourceKind::Article => &mut dynamic.rss_feeds,
        };
        if !persisted.contains(&key) {
            persisted.push(key);
            // The in-memory add stands even if the write fails; the next
            // successful add rewrites the whole file.
            if let Err(e) = self.write(&dynamic).await {
                error!("Could not save dynamic sources: {}", e);
            }
        }
        drop(dynamic);

        info!("Added {}", source);
        Ok(AddOutcome::Added { total })
    }

    /// Write the full dynamic set to disk.
    pub async fn persist(&self) -> Result<()> {
        let dynamic = self.dynamic.lock().await;
        self.write(&dynamic).await
    }

    async fn write(&self, dynamic: &DynamicSources) -> Result<()> {
        match &self.store {
            Some(store) => store.save(dynamic).await,
            None => Ok(()),
        }
    }

    pub async fn sources_of_kind(&self, kind: SourceKind) -> Vec<Source> {
        let keys = self.list_for(kind).read().await.clone();
        keys.into_iter()
            .map(|key| match kind {
                SourceKind::Channel => Source::channel(key),
                SourceKind::Article => Source::article(key),
            })
            .collect()
    }

    pub async fn channels(&self) -> Vec<String> {
        self.channels.read().await.clone()
    }

    pub async fn feeds(&self) -> Vec<String> {
        self.feeds.read().await.clone()
    }

    pub async fn counts(&self) -> SourceCounts {
        SourceCounts {
            channels: self.channels.read().await.len(),
            feeds: self.feeds.read().await.len(),
        }
    }

    pub async fn dynamic_sources(&self) -> DynamicSources {
        self.dynamic.lock().await.clone()
    }

    fn list_for(&self, kind: SourceKind) -> &RwLock<Vec<String>> {
        match kind {
            SourceKind::Channel => &self.channels,
            SourceKind::Article => &self.feeds,
        }
    }
}

fn merge_unique<A, B>(first: A, second: B) -> Vec<String>
where
    A: IntoIterator<Item = String>,
    B: IntoIterator<Item = String>,
{
    let mut merged: Vec<String> = Vec::new();
    for key in first.into_iter().chain(second) {
        if !merged.contains(&key) {
            merged.push(key);
        }
    }
    merged
}
