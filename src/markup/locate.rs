//! Innermost-first location of paired pseudo-tags.
//!
//! Two pure pieces make up the locator:
//!
//! - [`scan_tag_end`] walks a single tag to its terminating `>`, skipping any
//!   `>` that sits inside a quoted attribute value.
//! - [`find_tag`] walks successive opening/closing marks of one tag name and
//!   pairs the first closing mark with the most recent opening mark.
//!
//! Pairing the first close with the latest open yields the innermost usage
//! first, which is what recursive expansion needs: a usage nested inside
//! another usage's content is always resolved before its parent.

use super::DocumentError;

/// Byte offsets of one paired tag occurrence.
///
/// ```text
/// <--template --name="x">inner</--template>
/// ^start                 ^content_start
///                             ^content_end
///                                          ^end
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpan {
    pub start: usize,
    pub content_start: usize,
    pub content_end: usize,
    pub end: usize,
}

impl TagSpan {
    /// Literal text of the opening tag, angle brackets included.
    pub fn opening<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.content_start]
    }

    /// Text between the opening and closing tags.
    pub fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.content_start..self.content_end]
    }
}

/// Return the offset just past the `>` that terminates the tag at `from`.
///
/// Single- and double-quoted runs are skipped. A quote preceded by a
/// backslash does not open a quoted run; inside one, any matching quote
/// closes it, so a value may end in a backslash. Returns `None` when the
/// text ends before an unquoted `>` is seen.
pub fn scan_tag_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate().skip(from) {
        let escaped = i > 0 && bytes[i - 1] == b'\\';
        match quote {
            None if (b == b'"' || b == b'\'') && !escaped => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            Some(q) if b == q => quote = None,
            _ => {}
        }
    }
    None
}

/// Find the innermost first occurrence of the paired tag `name`.
///
/// Returns `Ok(None)` when the text holds no opening or closing mark of the
/// tag at all.
pub fn find_tag(name: &str, text: &str) -> Result<Option<TagSpan>, DocumentError> {
    let mut open: Option<(usize, usize)> = None;
    let mut cursor = 0;

    loop {
        let Some(mark) = next_mark(text, name, cursor) else {
            return match open {
                None => Ok(None),
                Some(_) => Err(DocumentError::UnmatchedOpen),
            };
        };

        let tag_end = scan_tag_end(text, mark.at).ok_or(DocumentError::MissingBracket)?;

        if mark.closing {
            let (start, content_start) = open.ok_or(DocumentError::UnmatchedClose)?;
            return Ok(Some(TagSpan {
                start,
                content_start,
                content_end: mark.at,
                end: tag_end,
            }));
        }

        open = Some((mark.at, tag_end));
        cursor = tag_end;
    }
}

/// An opening (`<name`) or closing (`</name`) mark found in the text.
struct Mark {
    at: usize,
    closing: bool,
}

fn next_mark(text: &str, name: &str, from: usize) -> Option<Mark> {
    let mut pos = from;
    while let Some(rel) = text[pos..].find('<') {
        let at = pos + rel;
        let after_bracket = &text[at + 1..];
        let (closing, rest) = match after_bracket.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, after_bracket),
        };
        if let Some(after_name) = rest.strip_prefix(name)
            && ends_tag_name(after_name)
        {
            return Some(Mark { at, closing });
        }
        pos = at + 1;
    }
    None
}

/// `<--template` must not match `<--templates` or `<--template-list`.
fn ends_tag_name(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || c == '>' || c == '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "--template";

    fn spans(text: &str) -> (String, String) {
        let span = find_tag(TAG, text).unwrap().unwrap();
        (
            span.opening(text).to_string(),
            span.content(text).to_string(),
        )
    }

    // =========================================================================
    // scan_tag_end
    // =========================================================================

    #[test]
    fn scan_stops_at_first_bracket() {
        assert_eq!(scan_tag_end("<a b=\"c\">rest", 0), Some(9));
    }

    #[test]
    fn scan_ignores_bracket_in_double_quotes() {
        let text = r#"<--field --name="a>b">"#;
        assert_eq!(scan_tag_end(text, 0), Some(text.len()));
    }

    #[test]
    fn scan_ignores_bracket_in_single_quotes() {
        let text = "<x y='>>'>after";
        assert_eq!(scan_tag_end(text, 0), Some(10));
    }

    #[test]
    fn scan_escaped_quote_does_not_open() {
        let text = r#"<x y=\">z"#;
        assert_eq!(scan_tag_end(text, 0), Some(8));
    }

    #[test]
    fn scan_value_may_end_in_backslash() {
        let text = r#"<x a="C:\">rest>"#;
        assert_eq!(scan_tag_end(text, 0), Some(11));
    }

    #[test]
    fn scan_starts_at_offset() {
        let text = "<a><b>";
        assert_eq!(scan_tag_end(text, 3), Some(6));
    }

    #[test]
    fn scan_without_bracket_is_none() {
        assert_eq!(scan_tag_end(r#"<x y="unterminated>"#, 0), None);
        assert_eq!(scan_tag_end("<x", 0), None);
    }

    // =========================================================================
    // find_tag
    // =========================================================================

    #[test]
    fn no_tag_is_none() {
        assert_eq!(find_tag(TAG, "<p>plain</p>").unwrap(), None);
        assert_eq!(find_tag(TAG, "").unwrap(), None);
    }

    #[test]
    fn finds_single_tag_offsets() {
        let text = r#"ab<--template --name="x">in</--template>cd"#;
        let span = find_tag(TAG, text).unwrap().unwrap();
        assert_eq!(span.start, 2);
        assert_eq!(&text[span.content_start..], "in</--template>cd");
        assert_eq!(&text[span.content_end..span.end], "</--template>");
        assert_eq!(&text[span.end..], "cd");
    }

    #[test]
    fn finds_innermost_first() {
        let text = concat!(
            r#"<--template --name="outer">a"#,
            r#"<--template --name="inner">b</--template>"#,
            "c</--template>",
        );
        let (opening, content) = spans(text);
        assert_eq!(opening, r#"<--template --name="inner">"#);
        assert_eq!(content, "b");
    }

    #[test]
    fn siblings_resolve_leftmost_first() {
        let text = concat!(
            r#"<--template --name="one">1</--template>"#,
            r#"<--template --name="two">2</--template>"#,
        );
        let (opening, _) = spans(text);
        assert_eq!(opening, r#"<--template --name="one">"#);
    }

    #[test]
    fn quoted_bracket_in_opening_tag() {
        let text = r#"<--template --name="x" $a="1>2">body</--template>"#;
        let (opening, content) = spans(text);
        assert_eq!(opening, r#"<--template --name="x" $a="1>2">"#);
        assert_eq!(content, "body");
    }

    #[test]
    fn longer_tag_names_do_not_match() {
        let text = "<--templates>x</--templates>";
        assert_eq!(find_tag(TAG, text).unwrap(), None);
    }

    #[test]
    fn close_without_open_is_error() {
        let err = find_tag(TAG, "text</--template>").unwrap_err();
        assert_eq!(err, DocumentError::UnmatchedClose);
    }

    #[test]
    fn open_without_close_is_error() {
        let err = find_tag(TAG, r#"<--template --name="x">text"#).unwrap_err();
        assert_eq!(err, DocumentError::UnmatchedOpen);
    }

    #[test]
    fn open_without_bracket_is_error() {
        let err = find_tag(TAG, r#"<--template --name="x"#).unwrap_err();
        assert_eq!(err, DocumentError::MissingBracket);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            DocumentError::UnmatchedClose.to_string(),
            "closing tag with no matching open"
        );
        assert_eq!(
            DocumentError::UnmatchedOpen.to_string(),
            "opening tag with no matching close"
        );
        assert_eq!(DocumentError::MissingBracket.to_string(), "missing `>`");
    }
}
