use std::borrow::Cow;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Removes a literal `<![CDATA[` prefix and `]]>` suffix from a title.
///
/// Some feeds escape their CDATA wrappers, so the markers survive parsing as
/// plain text. Both markers must be present; a lone prefix or suffix is left
/// alone, and only one layer is removed.
///
/// # Examples
///
/// ```
/// use feedwatch::util::strip_cdata_markers;
///
/// assert_eq!(strip_cdata_markers("<![CDATA[Hello]]>"), "Hello");
/// assert_eq!(strip_cdata_markers("<![CDATA[Hello"), "<![CDATA[Hello");
/// assert_eq!(strip_cdata_markers("World"), "World");
/// ```
pub fn strip_cdata_markers(s: &str) -> &str {
    s.strip_prefix(CDATA_OPEN)
        .and_then(|inner| inner.strip_suffix(CDATA_CLOSE))
        .unwrap_or(s)
}

/// Makes feed-controlled text safe to print as a single terminal line.
///
/// Removes:
/// - ASCII control chars (0x00-0x1F except tab/LF/CR, and 0x7F)
/// - ANSI CSI sequences: `\x1b[` ... final byte 0x40-0x7E
/// - ANSI OSC sequences: `\x1b]` ... BEL or ST (`\x1b\\`)
/// - Bare ESC
///
/// Tabs, line feeds and carriage returns are folded into a single space each
/// so one title can never span several log lines.
///
/// Returns `Cow::Borrowed` when nothing needs changing.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let len = bytes.len();

    if !bytes.iter().any(|&b| b < 0x20 || b == 0x7f) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(len);
    let mut i = 0;
    // Start of the pending run of bytes that are copied through unchanged
    let mut run = 0;

    while i < len {
        let b = bytes[i];
        if b >= 0x20 && b != 0x7f {
            i += 1;
            continue;
        }

        out.push_str(&s[run..i]);

        match b {
            0x09 | 0x0a | 0x0d => {
                // CRLF folds to one space, not two
                if b == 0x0d && bytes.get(i + 1) == Some(&0x0a) {
                    i += 1;
                }
                out.push(' ');
                i += 1;
            }
            0x1b if bytes.get(i + 1) == Some(&b'[') => {
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            }
            0x1b if bytes.get(i + 1) == Some(&b']') => {
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }

        run = i;
    }

    out.push_str(&s[run..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_cdata_both_markers() {
        assert_eq!(strip_cdata_markers("<![CDATA[Hello]]>"), "Hello");
        assert_eq!(strip_cdata_markers("<![CDATA[]]>"), "");
    }

    #[test]
    fn test_strip_cdata_requires_both_affixes() {
        assert_eq!(strip_cdata_markers("<![CDATA[Hello"), "<![CDATA[Hello");
        assert_eq!(strip_cdata_markers("Hello]]>"), "Hello]]>");
    }

    #[test]
    fn test_strip_cdata_only_one_layer() {
        assert_eq!(
            strip_cdata_markers("<![CDATA[<![CDATA[x]]>]]>"),
            "<![CDATA[x]]>"
        );
    }

    #[test]
    fn test_strip_cdata_markers_must_be_affixes() {
        let s = "Using <![CDATA[ blocks ]]> in XML";
        assert_eq!(strip_cdata_markers(s), s);
    }

    #[test]
    fn test_sanitize_clean_text_returns_borrowed() {
        let input = "Rust 1.80 released: what's new";
        let result = sanitize_line(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_sanitize_folds_line_breaks() {
        assert_eq!(sanitize_line("first\nsecond"), "first second");
        assert_eq!(sanitize_line("first\r\nsecond"), "first second");
        assert_eq!(sanitize_line("a\tb"), "a b");
    }

    #[test]
    fn test_sanitize_removes_controls() {
        let input = "he\x00ll\x07o\x08 w\x0bor\x0cld\x01!\x7f";
        assert_eq!(sanitize_line(input), "hello world!");
    }

    #[test]
    fn test_sanitize_ansi_sequences() {
        assert_eq!(sanitize_line("\x1b[31mred\x1b[0m text"), "red text");
        assert_eq!(sanitize_line("\x1b]0;title\x07visible"), "visible");
        assert_eq!(sanitize_line("\x1b]8;;http://x\x1b\\link"), "link");
        assert_eq!(sanitize_line("bare\x1besc"), "bareesc");
    }

    #[test]
    fn test_sanitize_unicode_preserved() {
        assert_eq!(
            sanitize_line("Привет\n世界 🎉"),
            "Привет 世界 🎉"
        );
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_line(""), "");
    }
}
