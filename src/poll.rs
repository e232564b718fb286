//! One poll cycle: fetch, extract, filter.

use thiserror::Error;
use tracing::Instrument;

use crate::feed::{extract_titles, FetchError, Fetcher, ParseError};
use crate::novelty::SeenSet;

/// Why a poll cycle was skipped.
///
/// Both variants leave the seen set untouched; the next cycle simply tries
/// again.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to parse feed: {0}")]
    Parse(#[from] ParseError),
}

/// Runs one fetch, extract, filter pass against `feed_url`.
///
/// Each title not yet in `seen` is recorded and passed to `on_new`, oldest
/// first. Returns the number of new titles; `Ok(0)` when nothing changed.
///
/// # Errors
///
/// Returns [`PollError`] if the fetch or the parse fails. In that case
/// `on_new` is never called and `seen` is not modified.
pub async fn run_once<F>(
    fetcher: &Fetcher,
    feed_url: &str,
    seen: &mut SeenSet,
    on_new: F,
) -> Result<usize, PollError>
where
    F: FnMut(&str),
{
    let span = tracing::debug_span!("poll", feed = %feed_url);

    let bytes = fetcher.fetch(feed_url).instrument(span.clone()).await?;

    let _guard = span.enter();
    let titles = extract_titles(&bytes)?;
    let reported = seen.report_new(&titles, on_new);

    tracing::debug!(
        bytes = bytes.len(),
        items = titles.len(),
        new = reported,
        seen = seen.len(),
        "Poll cycle complete"
    );

    Ok(reported)
}
