use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::util::strip_cdata_markers;

/// Errors that can occur while extracting titles from a feed document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML reader rejected the document (bad syntax, mismatched tags,
    /// unknown entities, invalid encoding).
    #[error("XML parse error: {0}")]
    Xml(String),
    /// The document ended while elements were still open.
    #[error("Document ended with {0} unclosed element(s)")]
    Unclosed(usize),
}

/// Title collection state for one open `<item>`.
struct ItemState {
    /// Slot in the output reserved when the item opened.
    index: usize,
    title: Option<String>,
    /// Depth of the `<title>` element whose text is being collected.
    collecting_at: Option<usize>,
}

/// Extracts article titles from an RSS document, in document order.
///
/// Every `<item>` element yields exactly one entry: the text of its first
/// `<title>` descendant, or an empty string when it has none. Text and CDATA
/// nodes inside the title are concatenated as-is (entities unescaped, no
/// trimming), then a literal `<![CDATA[`...`]]>` wrapper is removed if the
/// feed escaped its CDATA section.
///
/// Entries are ordered by where each `<item>` starts. A nested item is its
/// own entry and does not end the item around it; a `<title>` belongs to the
/// innermost open item.
///
/// Only the qualified names `item` and `title` are matched, so
/// `<media:title>` and Atom `<entry>` elements are ignored. Bytes with no
/// element at all yield an empty list.
///
/// # Errors
///
/// Returns [`ParseError`] on reader errors or when elements are still open
/// at EOF.
pub fn extract_titles(bytes: &[u8]) -> Result<Vec<String>, ParseError> {
    // quick-xml 0.37 only resolves the five predefined entities; anything
    // declared in a DOCTYPE fails in unescape() instead of being expanded.
    let mut reader = Reader::from_reader(bytes);

    let mut titles: Vec<String> = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut open_items: Vec<ItemState> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                match e.name().as_ref() {
                    b"item" => {
                        open_items.push(ItemState {
                            index: titles.len(),
                            title: None,
                            collecting_at: None,
                        });
                        titles.push(String::new());
                    }
                    b"title" => {
                        if let Some(state) = open_items.last_mut() {
                            if state.title.is_none() && state.collecting_at.is_none() {
                                state.title = Some(String::new());
                                state.collecting_at = Some(depth);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"item" => titles.push(String::new()),
                b"title" => {
                    // <title/> counts as a present, empty title
                    if let Some(state) = open_items.last_mut() {
                        if state.title.is_none() && state.collecting_at.is_none() {
                            state.title = Some(String::new());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if let Some(state) = open_items.last_mut() {
                    if state.collecting_at == Some(depth) {
                        state.collecting_at = None;
                    }
                }
                if e.name().as_ref() == b"item" {
                    if let Some(done) = open_items.pop() {
                        titles[done.index] = finish_title(done.title);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) => {
                if let Some(text) = collecting(&mut open_items) {
                    let unescaped = e.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(text) = collecting(&mut open_items) {
                    let decoded = reader
                        .decoder()
                        .decode(&e)
                        .map_err(|e| ParseError::Xml(e.to_string()))?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(ParseError::Unclosed(depth));
    }

    Ok(titles)
}

/// Returns the title buffer if the reader is inside the innermost item's title.
fn collecting(open_items: &mut [ItemState]) -> Option<&mut String> {
    match open_items.last_mut() {
        Some(ItemState {
            title: Some(title),
            collecting_at: Some(_),
            ..
        }) => Some(title),
        _ => None,
    }
}

fn finish_title(title: Option<String>) -> String {
    match title {
        Some(raw) => {
            let stripped = strip_cdata_markers(&raw);
            if stripped.len() == raw.len() {
                raw
            } else {
                stripped.to_owned()
            }
        }
        None => String::new(),
    }
}
