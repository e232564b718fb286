//! Small helpers shared by the fetcher, extractor and the binary.
//!
//! - **URL validation**: feed URLs must be http(s) with a host
//! - **Text processing**: CDATA marker stripping and single-line log sanitizing

mod text;
mod url_validator;

pub use text::{sanitize_line, strip_cdata_markers};
pub use url_validator::{validate_feed_url, UrlValidationError};
