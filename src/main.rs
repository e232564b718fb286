use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;

use feedwatch::config::Config;
use feedwatch::feed::Fetcher;
use feedwatch::util::sanitize_line;
use feedwatch::watcher::Watcher;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Default config file location (~/.config/feedwatch/config.toml)
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("feedwatch")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "feedwatch",
    about = "Poll an RSS feed and log article titles as they appear"
)]
struct Args {
    /// Config file (default: ~/.config/feedwatch/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Feed URL to watch (overrides the config file)
    #[arg(long, value_name = "URL")]
    feed: Option<String>,

    /// Seconds between polls (overrides the config file)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Request deadline in seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Poll once, print every title in the feed, and exit
    #[arg(long)]
    once: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match self.config.clone().or_else(default_config_path) {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(feed) = &self.feed {
            config.feed_url = feed.clone();
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }

        config.validate().context("Invalid command-line override")?;
        Ok(config)
    }
}

/// Logs one newly seen title.
fn report(title: &str) {
    tracing::info!("{}", sanitize_line(title));
}

/// Flips `tx` to `true` on SIGINT/SIGTERM.
async fn forward_shutdown_signal(tx: &watch::Sender<bool>) -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down gracefully"),
            _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down gracefully"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl-C, shutting down gracefully");
    }

    let _ = tx.send(true);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // The log is the output, so show info-level lines unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    tracing::debug!(?config, "Resolved configuration");

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let fetcher = Fetcher::new(client)
        .with_timeout(config.request_timeout())
        .with_max_size(config.max_feed_size_bytes);

    let mut watcher = Watcher::new(fetcher, config.feed_url.clone(), config.poll_interval());

    if args.once {
        let count = watcher
            .poll_once(report)
            .await
            .with_context(|| format!("Failed to poll {}", config.feed_url))?;
        tracing::debug!(new = count, "Single poll complete");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = forward_shutdown_signal(&shutdown_tx).await {
            tracing::warn!(error = %e, "Failed to install signal handlers");
            // Keep the sender alive so the watcher is not stopped by its drop
            std::future::pending::<()>().await;
        }
    });

    watcher.run(shutdown_rx, report).await;
    Ok(())
}
