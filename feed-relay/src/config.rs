use crate::notifier::DISCORD_API_BASE;
use crate::relevance::RelevanceFilter;
use crate::state::DEFAULT_DYNAMIC_SOURCES_FILE;
use crate::types::{FetchConfig, RelayError, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_YOUTUBE_CHANNELS: &[&str] = &[
    "UCwlP-bPZmqpUuAi3L7q-FBw",
    "UC7_gcs09iThXybpVgjHZ_7g",
    "UCoxcjq-8xIDTYp3uz647V5A",
    "UCYO_jab_esuFRV4b17AJtAw",
    "UCkLHy_jxeaHTZCfGalg6QaA",
];

pub const DEFAULT_NEWS_FEEDS: &[&str] = &[
    "https://phys.org/rss-feed/search/?search=quantum+computing",
    "https://www.sciencedaily.com/rss/matter_energy/quantum_computing.xml",
    "https://quantumcomputingreport.com/feed/",
    "https://thequantuminsider.com/feed/",
];

/// Runtime settings, read from flags or the environment (a `.env` file is
/// loaded first by the binary).
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Channel that receives notifications
    #[arg(long, env = "NEWS_CHANNEL_ID", default_value_t = 0)]
    pub news_channel_id: u64,

    /// YouTube channel ids to monitor (comma-separated in the environment)
    #[arg(long = "youtube-channel", env = "YOUTUBE_CHANNELS", value_delimiter = ',')]
    pub youtube_channels: Vec<String>,

    /// RSS/Atom feed URLs to monitor (comma-separated in the environment)
    #[arg(long = "news-feed", env = "NEWS_FEEDS", value_delimiter = ',')]
    pub news_feeds: Vec<String>,

    /// Seconds between YouTube sweeps
    #[arg(long, env = "YOUTUBE_CHECK_INTERVAL", default_value_t = 3600)]
    pub youtube_check_interval: u64,

    /// Seconds between news sweeps
    #[arg(long, env = "NEWS_CHECK_INTERVAL", default_value_t = 1800)]
    pub news_check_interval: u64,

    /// Where sources added at runtime are stored
    #[arg(long, env = "DYNAMIC_SOURCES_FILE", default_value = DEFAULT_DYNAMIC_SOURCES_FILE)]
    pub dynamic_sources_file: PathBuf,

    /// Pause between two sources of one sweep, in milliseconds
    #[arg(long, env = "FETCH_PACING_MS", default_value_t = 2000)]
    pub pacing_ms: u64,

    /// HTTP timeout for feed and API requests, in seconds
    #[arg(long, env = "FETCH_TIMEOUT", default_value_t = 30)]
    pub fetch_timeout: u64,

    #[arg(long, env = "DISCORD_API_BASE", default_value = DISCORD_API_BASE)]
    pub discord_api_base: String,

    /// Override the relevance vocabulary (comma-separated in the environment)
    #[arg(long = "keyword", env = "RELEVANCE_KEYWORDS", value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Log notifications instead of posting them
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.dry_run {
            if self.token().is_none() {
                return Err(RelayError::Config(
                    "DISCORD_TOKEN is required unless --dry-run is set".to_string(),
                ));
            }
            if self.news_channel_id == 0 {
                return Err(RelayError::Config(
                    "NEWS_CHANNEL_ID must be a non-zero channel id unless --dry-run is set"
                        .to_string(),
                ));
            }
        }
        if self.youtube_check_interval == 0 {
            return Err(RelayError::Config(
                "YOUTUBE_CHECK_INTERVAL must be a positive number of seconds".to_string(),
            ));
        }
        if self.news_check_interval == 0 {
            return Err(RelayError::Config(
                "NEWS_CHECK_INTERVAL must be a positive number of seconds".to_string(),
            ));
        }
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.discord_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Configured channels, or the built-in list when none are given.
    pub fn channels(&self) -> Vec<String> {
        or_defaults(&self.youtube_channels, DEFAULT_YOUTUBE_CHANNELS)
    }

    pub fn feeds(&self) -> Vec<String> {
        or_defaults(&self.news_feeds, DEFAULT_NEWS_FEEDS)
    }

    pub fn youtube_interval(&self) -> Duration {
        Duration::from_secs(self.youtube_check_interval)
    }

    pub fn news_interval(&self) -> Duration {
        Duration::from_secs(self.news_check_interval)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn relevance(&self) -> RelevanceFilter {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            RelevanceFilter::default()
        } else {
            RelevanceFilter::new(&self.keywords)
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_seconds: self.fetch_timeout,
            ..FetchConfig::default()
        }
    }
}

fn or_defaults(configured: &[String], defaults: &[&str]) -> Vec<String> {
    let configured: Vec<String> = configured
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if configured.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["feed-relay"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    fn dry_run() -> Config {
        parse(&["--dry-run", "--youtube-check-interval", "60", "--news-check-interval", "60"])
    }

    #[test]
    fn repeated_and_delimited_flags_are_collected() {
        let config = parse(&[
            "--news-feed",
            "https://a.example/rss, https://b.example/atom",
            "--news-feed",
            "https://c.example/feed",
        ]);
        assert_eq!(
            config.feeds(),
            vec![
                "https://a.example/rss".to_string(),
                "https://b.example/atom".to_string(),
                "https://c.example/feed".to_string()
            ]
        );
    }

    #[test]
    fn empty_source_lists_fall_back_to_defaults() {
        let mut config = dry_run();
        config.youtube_channels = vec![" ".to_string()];
        config.news_feeds.clear();
        assert_eq!(config.channels().len(), DEFAULT_YOUTUBE_CHANNELS.len());
        assert_eq!(config.feeds()[3], "https://thequantuminsider.com/feed/");
    }

    #[test]
    fn dry_run_needs_no_credentials() {
        let mut config = dry_run();
        config.discord_token = None;
        config.news_channel_id = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn live_run_requires_token_and_channel() {
        let mut config = dry_run();
        config.dry_run = false;
        config.discord_token = Some("  ".to_string());
        config.news_channel_id = 123;
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));

        config.discord_token = Some("token".to_string());
        config.news_channel_id = 0;
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));

        config.news_channel_id = 123;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = dry_run();
        config.news_check_interval = 0;
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));
    }

    #[test]
    fn durations_and_keywords() {
        let mut config = dry_run();
        config.pacing_ms = 0;
        config.keywords = vec!["Photonics".to_string()];
        assert_eq!(config.pacing(), Duration::ZERO);
        assert_eq!(config.news_interval(), Duration::from_secs(60));
        assert_eq!(config.relevance().keywords(), &["photonics".to_string()]);
    }
}
