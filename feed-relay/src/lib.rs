pub mod commands;
pub mod config;
pub mod dedup;
pub mod fetcher;
pub mod notifier;
pub mod parser;
pub mod poller;
pub mod registry;
pub mod relay;
pub mod relevance;
pub mod rss_utils;
pub mod scheduler;
pub mod state;
pub mod traits;
pub mod types;

pub use commands::{Command, CommandHandler, CommandReply};
pub use config::Config;
pub use fetcher::Fetcher;
pub use notifier::{DiscordNotifier, LogNotifier};
pub use parser::FeedParser;
pub use poller::{ArticlePoller, PollerSettings, UploadPoller};
pub use registry::{AddOutcome, SourceRegistry};
pub use relay::FeedRelay;
pub use relevance::RelevanceFilter;
pub use scheduler::{Readiness, RecurringTask};
pub use state::{DynamicSources, DynamicSourcesStore};
pub use traits::{CycleReport, FeedSource, PollJob};
pub use types::*;
