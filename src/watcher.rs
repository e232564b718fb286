//! Fixed-interval polling loop.
//!
//! The [`Watcher`] owns the seen set and the feed settings, and runs
//! [`run_once`](crate::poll::run_once) on a timer until told to stop.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::feed::Fetcher;
use crate::novelty::SeenSet;
use crate::poll::{run_once, PollError};

/// Default time between the start of two poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Polls one feed on a fixed interval and reports unseen titles.
pub struct Watcher {
    fetcher: Fetcher,
    feed_url: String,
    interval: Duration,
    seen: SeenSet,
}

impl Watcher {
    /// Creates a watcher with an empty seen set.
    ///
    /// The first cycle therefore reports every title currently in the feed.
    pub fn new(fetcher: Fetcher, feed_url: impl Into<String>, interval: Duration) -> Self {
        Self {
            fetcher,
            feed_url: feed_url.into(),
            interval,
            seen: SeenSet::new(),
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Runs a single cycle immediately.
    pub async fn poll_once<F>(&mut self, on_new: F) -> Result<usize, PollError>
    where
        F: FnMut(&str),
    {
        run_once(&self.fetcher, &self.feed_url, &mut self.seen, on_new).await
    }

    /// Polls until `shutdown` becomes `true` or its sender is dropped.
    ///
    /// The first cycle runs immediately. Cycles never overlap: if one runs
    /// longer than the interval, the missed ticks are skipped rather than
    /// fired back to back. A failed cycle is logged and the loop carries on.
    ///
    /// Shutdown is checked between cycles and while a fetch is in flight; an
    /// interrupted fetch is dropped and its cycle has no effect.
    pub async fn run<F>(&mut self, mut shutdown: watch::Receiver<bool>, mut on_new: F)
    where
        F: FnMut(&str),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            feed = %self.feed_url,
            interval_secs = self.interval.as_secs_f64(),
            "Watching feed"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    // Err means every sender is gone; nobody can stop us later
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }

                _ = ticker.tick() => {}
            }

            let abandoned = {
                let cycle = run_once(&self.fetcher, &self.feed_url, &mut self.seen, &mut on_new);
                tokio::pin!(cycle);

                // A change that leaves the flag at false must not cancel the cycle
                loop {
                    tokio::select! {
                        biased;

                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break true;
                            }
                        }

                        result = &mut cycle => {
                            if let Err(e) = result {
                                tracing::warn!(feed = %self.feed_url, error = %e, "Poll cycle failed");
                            }
                            break false;
                        }
                    }
                }
            };

            if abandoned {
                tracing::info!("Shutdown requested during poll cycle, abandoning it");
                break;
            }
        }

        tracing::info!(
            feed = %self.feed_url,
            seen = self.seen.len(),
            "Stopped watching feed"
        );
    }
}
