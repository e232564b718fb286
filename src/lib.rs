//! Polls an RSS feed and reports article titles it has not seen before.
//!
//! Each poll cycle fetches the feed ([`feed::Fetcher`]), extracts item titles
//! in document order ([`feed::extract_titles`]) and hands them to a
//! [`novelty::SeenSet`], which reports only unseen titles, oldest first.
//! [`watcher::Watcher`] repeats that on a fixed interval.

pub mod config;
pub mod feed;
pub mod novelty;
pub mod poll;
pub mod util;
pub mod watcher;
