//! Getting titles out of a remote feed.
//!
//! - [`fetcher`] - Bounded-time HTTP retrieval of the raw document
//! - [`parser`] - Title extraction from RSS `<item>` elements via `quick-xml`
//!
//! # Example
//!
//! ```no_run
//! use feedwatch::feed::{extract_titles, Fetcher};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = Fetcher::default().fetch("https://habr.com/ru/rss/all/").await?;
//! let titles = extract_titles(&bytes)?;
//! # Ok(())
//! # }
//! ```

mod fetcher;
mod parser;

pub use fetcher::{FetchError, Fetcher, DEFAULT_MAX_FEED_SIZE, DEFAULT_TIMEOUT};
pub use parser::{extract_titles, ParseError};
