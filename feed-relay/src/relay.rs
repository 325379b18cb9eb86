use crate::commands::CommandHandler;
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::notifier::{DiscordNotifier, LogNotifier};
use crate::poller::{ArticlePoller, PollerSettings, UploadPoller};
use crate::registry::SourceRegistry;
use crate::relevance::RelevanceFilter;
use crate::scheduler::{Readiness, RecurringTask};
use crate::state::DynamicSourcesStore;
use crate::traits::{FeedSource, PollJob};
use crate::types::{Notifier, RelayError, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// Owns the registry, the notifier and both pollers, and drives the pollers
/// once the destination is reachable.
pub struct FeedRelay {
    registry: Arc<SourceRegistry>,
    notifier: Arc<dyn Notifier>,
    news: Arc<ArticlePoller>,
    youtube: Arc<UploadPoller>,
    readiness: Readiness,
    tasks: Vec<RecurringTask>,
}

impl FeedRelay {
    pub fn new(
        registry: Arc<SourceRegistry>,
        feeds: Arc<dyn FeedSource>,
        notifier: Arc<dyn Notifier>,
        relevance: RelevanceFilter,
        news_settings: PollerSettings,
        youtube_settings: PollerSettings,
    ) -> Self {
        let news = Arc::new(ArticlePoller::new(
            Arc::clone(&registry),
            Arc::clone(&feeds),
            Arc::clone(&notifier),
            relevance,
            news_settings,
        ));
        let youtube = Arc::new(UploadPoller::new(
            Arc::clone(&registry),
            feeds,
            Arc::clone(&notifier),
            youtube_settings,
        ));

        Self {
            registry,
            notifier,
            news,
            youtube,
            readiness: Readiness::new(),
            tasks: Vec::new(),
        }
    }

    /// Wire everything from configuration. Without a token, or in dry-run
    /// mode, notifications go to the log.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch_config())?;

        let notifier: Arc<dyn Notifier> = match (config.dry_run, config.token()) {
            (false, Some(token)) => Arc::new(
                DiscordNotifier::new(fetcher.client().clone(), token, config.news_channel_id)
                    .with_api_base(&config.discord_api_base),
            ),
            _ => Arc::new(LogNotifier),
        };

        let registry = Arc::new(
            SourceRegistry::load(
                config.channels(),
                config.feeds(),
                DynamicSourcesStore::new(&config.dynamic_sources_file),
            )
            .await,
        );

        Ok(Self::new(
            registry,
            Arc::new(fetcher),
            notifier,
            config.relevance(),
            PollerSettings::new(config.news_interval()).with_pacing(config.pacing()),
            PollerSettings::new(config.youtube_interval()).with_pacing(config.pacing()),
        ))
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub fn news(&self) -> &Arc<ArticlePoller> {
        &self.news
    }

    pub fn youtube(&self) -> &Arc<UploadPoller> {
        &self.youtube
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    pub fn commands(&self) -> CommandHandler {
        CommandHandler::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.news),
            Arc::clone(&self.youtube),
        )
    }

    /// Check the destination and open the readiness gate. Pollers started
    /// before this stay idle until it succeeds.
    pub async fn connect(&self) -> Result<()> {
        self.notifier.check_destination().await?;
        info!("Destination {} is reachable", self.notifier.name());
        self.readiness.mark_ready();
        Ok(())
    }

    /// Spawn both pollers. A second call while they run is ignored.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            warn!("Pollers already started");
            return;
        }

        self.tasks.push(RecurringTask::for_job(
            Arc::clone(&self.news),
            self.readiness.clone(),
        ));
        self.tasks.push(RecurringTask::for_job(
            Arc::clone(&self.youtube),
            self.readiness.clone(),
        ));

        info!(
            "Pollers scheduled: news every {}s, youtube every {}s",
            self.news.interval().as_secs(),
            self.youtube.interval().as_secs()
        );
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(RecurringTask::is_running)
    }

    /// Cancel both pollers and wait for them to stop.
    pub async fn shutdown(&mut self) {
        for task in &mut self.tasks {
            task.cancel().await;
        }
        self.tasks.clear();
        info!("Feed relay stopped");
    }
}

/// Read commands line by line and write each reply followed by a blank line.
/// Lines that are not commands get no reply. Returns when `input` ends.
pub async fn serve_console<R, W>(handler: &CommandHandler, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let console_error = |e: std::io::Error| RelayError::Console(e.to_string());

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.map_err(console_error)? {
        if let Some(reply) = handler.handle_line(&line).await {
            output
                .write_all(format!("{}\n\n", reply).as_bytes())
                .await
                .map_err(console_error)?;
            output.flush().await.map_err(console_error)?;
        }
    }
    Ok(())
}
