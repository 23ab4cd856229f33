//! Text helpers shared by the block driver and the span annotator.

/// Encode angle brackets so source text displays literally inside a figure.
///
/// Only `<` and `>` are touched; everything else passes through.
#[must_use]
pub fn escape_angles(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Reverse [`escape_angles`].
#[must_use]
pub(crate) fn unescape_angles(s: &str) -> String {
    s.replace("&lt;", "<").replace("&gt;", ">")
}

/// Remove every `<...>` tag that opens and closes on the same line.
pub(crate) fn strip_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let after = &rest[open..];
        let line_end = after.find('\n').unwrap_or(after.len());
        match after[..line_end].find('>') {
            Some(close) => rest = &after[close + 1..],
            None => {
                result.push('<');
                rest = &after[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Reduce backslash escapes of `[`, `]`, `{`, `}` and `\` to the bare character.
pub(crate) fn unescape_syntax(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '[' | ']' | '{' | '}' | '\\')
        {
            result.push(next);
            chars.next();
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a figure title to an identifier.
///
/// Lowercases alphanumerics, turns runs of whitespace, dashes and underscores
/// into a single dash, and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Count complete `<figure ...>...</figure>` elements already present in `text`.
pub(crate) fn count_figures(text: &str) -> usize {
    const OPEN: &str = "<figure";
    const CLOSE: &str = "</figure>";

    let mut count = 0;
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(tag_end) = after_open.find('>') else {
            break;
        };
        let inner = &after_open[tag_end + 1..];
        // The element must have at least one character of content.
        let Some(first) = inner.chars().next() else {
            break;
        };
        let search_from = first.len_utf8();
        match inner[search_from..].find(CLOSE) {
            Some(end) => {
                count += 1;
                rest = &inner[search_from + end + CLOSE.len()..];
            }
            None => break,
        }
    }

    count
}
