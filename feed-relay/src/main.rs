use anyhow::Context;
use clap::{Parser, Subcommand};
use feed_relay::relay::serve_console;
use feed_relay::{Command, Config, FeedRelay};
use tokio::io::BufReader;
use tracing::{error, info};

/// Relays new quantum-computing articles and YouTube uploads to a Discord channel
#[derive(Parser)]
#[command(name = "feed-relay", version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Poll all sources and post new items (default)
    Run,
    /// Print every monitored source
    ListSources,
    /// Add a YouTube channel by id and save it
    AddSourceYoutube {
        /// 24-character channel id starting with UC
        channel_id: String,
    },
    /// Add an RSS/Atom feed by URL and save it
    AddSourceRss {
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => run(cli.config).await,
        CliCommand::ListSources => one_shot(&cli.config, Command::ListSources).await,
        CliCommand::AddSourceYoutube { channel_id } => {
            one_shot(&cli.config, Command::AddSourceYoutube(Some(channel_id))).await
        }
        CliCommand::AddSourceRss { url } => {
            one_shot(&cli.config, Command::AddSourceRss(Some(url))).await
        }
    }
}

/// Execute one command against the persisted sources without polling.
async fn one_shot(config: &Config, command: Command) -> anyhow::Result<()> {
    let relay = FeedRelay::from_config(config)
        .await
        .context("failed to set up feed relay")?;
    let reply = relay.commands().execute(command).await;
    println!("{}", reply);
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    info!("Starting feed relay");
    let mut relay = FeedRelay::from_config(&config)
        .await
        .context("failed to set up feed relay")?;

    relay.start();
    if let Err(e) = relay.connect().await {
        relay.shutdown().await;
        return Err(e).context("notification destination is not reachable");
    }

    let commands = relay.commands();
    let console = tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = serve_console(&commands, stdin, tokio::io::stdout()).await {
            error!("Console stopped: {}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    console.abort();
    relay.shutdown().await;
    Ok(())
}
