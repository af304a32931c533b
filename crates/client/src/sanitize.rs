//! Cleaning user-supplied text before it is displayed or sent.

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drop anything between `<` and the next `>`.
///
/// An unterminated `<` drops the rest of the input.
#[must_use]
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match (in_tag, c) {
            (false, '<') => in_tag = true,
            (true, '>') => in_tag = false,
            (false, _) => out.push(c),
            (true, _) => {}
        }
    }
    out
}

/// Strip tags and trim, leaving the text unescaped.
///
/// For values stored or sent to the backend; escape at display time.
#[must_use]
pub fn clean_text(input: &str) -> String {
    strip_tags(input).trim().to_string()
}

/// Strip tags, trim, then escape what is left.
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    escape_html(&clean_text(input))
}
