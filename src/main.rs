use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use feedcycle::app::{App, AppEvent};
use feedcycle::config::Config;
use feedcycle::feed::{self, HttpFeedSource};
use feedcycle::registry::{default_feeds, FeedRegistry, FeedSeed};
use feedcycle::ui;

/// Get the config directory path (~/.config/feedcycle/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedcycle"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedcycle",
    about = "Terminal RSS reader that cycles through your feeds"
)]
struct Args {
    /// Config file (default: ~/.config/feedcycle/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read the feed list from an OPML file instead of the config
    #[arg(long, value_name = "FILE")]
    opml: Option<PathBuf>,

    /// Seconds of inactivity before moving to the next feed (0 disables)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,
}

/// Feed list in priority order: OPML file, config `[[feeds]]`, built-in defaults.
async fn resolve_seeds(args: &Args, config: &Config) -> Result<Vec<FeedSeed>> {
    if let Some(path) = &args.opml {
        let seeds = feed::opml::parse(path)
            .await
            .with_context(|| format!("Failed to parse OPML file '{}'", path.display()))?;
        if seeds.is_empty() {
            anyhow::bail!(
                "No valid feeds found in '{}': the file may be empty or contain only invalid URLs",
                path.display()
            );
        }
        tracing::info!(feeds = seeds.len(), path = %path.display(), "Loaded feeds from OPML");
        return Ok(seeds);
    }

    if !config.feeds.is_empty() {
        let seeds = config.valid_feeds();
        if seeds.is_empty() {
            anyhow::bail!("No valid feeds in config: every [[feeds]] URL was rejected");
        }
        return Ok(seeds);
    }

    Ok(default_feeds())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let cycle_period = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.cycle_period());

    let seeds = resolve_seeds(&args, &config).await?;
    let registry = FeedRegistry::new(seeds).context("Invalid feed list")?;
    let source = HttpFeedSource::new(config.request_timeout())
        .context("Failed to create HTTP client")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let mut app = App::new(registry, Arc::new(source), event_tx, cycle_period);
    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    // The first feed is shown on startup
    app.load_feed(0, None);

    ui::run(&mut app, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
