//! Figure block and global directive line grammar.
//!
//! A figure block is a fenced region whose opening line names `figure` or
//! `figuremark`:
//!
//! ````text
//! ```figure Optional title {#id .class :directive=value}
//! body
//! ```
//! ````
//!
//! A global directive line is `{figure ...}` alone on a line.

use std::ops::Range;

const KEYWORD_LONG: &str = "figuremark";
const KEYWORD_SHORT: &str = "figure";

/// Marker that suppresses block detection on the following line.
const COMMENT_OPEN: &str = "<!--\n";

/// A figure block located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FigureBlock<'a> {
    /// Byte range of the whole block, from the opening line through the
    /// closing fence (excluding the line break after it).
    pub range: Range<usize>,
    /// The opening line, without its line break.
    pub opening: &'a str,
    /// The closing line, without its line break.
    pub closing: &'a str,
    /// Fence string: the run of backticks or tildes.
    pub fence: &'a str,
    /// Byte offset in `opening` where the keyword ends.
    pub keyword_end: usize,
    /// Trimmed title, if any.
    pub title: Option<&'a str>,
    /// Byte range in `opening` of the `{...}` attribute list, braces included.
    pub attrs: Option<Range<usize>>,
    /// Body lines joined by their original line breaks, `None` when the
    /// closing fence immediately follows the opening line.
    pub body: Option<&'a str>,
}

impl<'a> FigureBlock<'a> {
    /// Source text of the whole block.
    pub(crate) fn source<'t>(&self, text: &'t str) -> &'t str {
        &text[self.range.clone()]
    }

    /// Raw attribute list without braces.
    pub(crate) fn attributes(&self) -> Option<&'a str> {
        self.attrs
            .as_ref()
            .map(|r| &self.opening[r.start + 1..r.end - 1])
    }
}

/// Opening line pieces.
#[derive(Debug, PartialEq, Eq)]
struct Opening<'a> {
    fence: &'a str,
    keyword_end: usize,
    title: Option<&'a str>,
    attrs: Option<Range<usize>>,
}

/// Find the first complete figure block whose opening line starts at or
/// after `from`.
pub(crate) fn find_block(text: &str, from: usize) -> Option<FigureBlock<'_>> {
    let mut pos = from;
    if pos > 0 && !text[..pos].ends_with('\n') {
        pos += text[pos..].find('\n')? + 1;
    }

    while pos < text.len() {
        let end = line_end(text, pos);
        let line = &text[pos..end];

        if !text[..pos].ends_with(COMMENT_OPEN)
            && let Some(opening) = parse_opening(line)
            && let Some(block) = close_block(text, pos, end, opening)
        {
            return Some(block);
        }

        pos = end + 1;
    }

    None
}

/// Parse a global directive line, returning its attribute list.
pub(crate) fn parse_global_line(line: &str) -> Option<&str> {
    let inner = line.trim_end().strip_prefix('{')?.strip_suffix('}')?;
    let rest = strip_keyword(inner)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    if rest.contains('}') {
        return None;
    }
    Some(rest.trim())
}

fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |n| pos + n)
}

/// Strip a leading `figuremark` or `figure` keyword, ignoring ASCII case.
fn strip_keyword(s: &str) -> Option<&str> {
    keyword_lengths(s).next().map(|len| &s[len..])
}

/// Keyword lengths that match at the start of `s`, longest first.
fn keyword_lengths(s: &str) -> impl Iterator<Item = usize> + '_ {
    [KEYWORD_LONG, KEYWORD_SHORT].into_iter().filter_map(|keyword| {
        s.get(..keyword.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(keyword))
            .map(|_| keyword.len())
    })
}

fn parse_opening(line: &str) -> Option<Opening<'_>> {
    let first = line.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = line.chars().take_while(|&c| c == first).count();
    if count < 3 {
        return None;
    }

    let after = &line[count..];
    let keyword_start = line.len() - after.trim_start().len();
    let rest = &line[keyword_start..];

    keyword_lengths(rest).find_map(|len| {
        let keyword_end = keyword_start + len;
        let (title, attrs) = parse_tail(line, keyword_end)?;
        Some(Opening {
            fence: &line[..count],
            keyword_end,
            title,
            attrs,
        })
    })
}

/// Parse what follows the keyword: nothing, a title, and/or `{attrs}`.
fn parse_tail(line: &str, keyword_end: usize) -> Option<(Option<&str>, Option<Range<usize>>)> {
    let tail = &line[keyword_end..];
    if tail.trim().is_empty() {
        return Some((None, None));
    }
    if !tail.starts_with(|c: char| c.is_whitespace() || c == '{') {
        return None;
    }

    let Some(brace) = tail.find('{') else {
        return Some((Some(tail.trim()), None));
    };

    let after = &tail[brace + 1..];
    let close = after.find('}')?;
    if !after[close + 1..].trim().is_empty() {
        return None;
    }

    let title = Some(tail[..brace].trim()).filter(|t| !t.is_empty());
    let start = keyword_end + brace;
    Some((title, Some(start..start + close + 2)))
}

/// Locate the closing fence for an opening line at `start..opening_end`.
fn close_block<'a>(
    text: &'a str,
    start: usize,
    opening_end: usize,
    opening: Opening<'a>,
) -> Option<FigureBlock<'a>> {
    let body_start = opening_end + 1;
    let mut pos = body_start;

    while pos <= text.len() && opening_end < text.len() {
        let end = line_end(text, pos);
        let line = &text[pos..end];

        if line.trim_end() == opening.fence {
            let body = (pos > body_start).then(|| &text[body_start..pos - 1]);
            return Some(FigureBlock {
                range: start..end,
                opening: &text[start..opening_end],
                closing: line,
                fence: opening.fence,
                keyword_end: opening.keyword_end,
                title: opening.title,
                attrs: opening.attrs,
                body,
            });
        }

        if end == text.len() {
            break;
        }
        pos = end + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_block() {
        let text = "intro\n```figure\nline\n```\nafter";
        let block = find_block(text, 0).unwrap();
        assert_eq!(block.source(text), "```figure\nline\n```");
        assert_eq!(block.fence, "```");
        assert_eq!(block.title, None);
        assert_eq!(block.attributes(), None);
        assert_eq!(block.body, Some("line"));
    }

    #[test]
    fn test_title_and_attrs() {
        let text = "~~~~ FigureMark  My Title {#x .y}  \nbody\n~~~~\n";
        let block = find_block(text, 0).unwrap();
        assert_eq!(block.fence, "~~~~");
        assert_eq!(block.title, Some("My Title"));
        assert_eq!(block.attributes(), Some("#x .y"));
        assert_eq!(&block.opening[..block.keyword_end], "~~~~ FigureMark");
        assert_eq!(&block.opening[block.attrs.clone().unwrap()], "{#x .y}");
    }

    #[test]
    fn test_attrs_without_title() {
        let block = find_block("```figure{.a}\nx\n```", 0).unwrap();
        assert_eq!(block.title, None);
        assert_eq!(block.attributes(), Some(".a"));
    }

    #[test]
    fn test_empty_body() {
        let block = find_block("```figure\n```", 0).unwrap();
        assert_eq!(block.body, None);
    }

    #[test]
    fn test_multiline_body() {
        let block = find_block("```figure\na\n\nb\n```", 0).unwrap();
        assert_eq!(block.body, Some("a\n\nb"));
    }

    #[test]
    fn test_closing_must_match_fence() {
        assert_eq!(find_block("````figure\nx\n```\n", 0), None);
        let block = find_block("````figure\n```\n```` \n", 0).unwrap();
        assert_eq!(block.body, Some("```"));
        assert_eq!(block.closing, "```` ");
    }

    #[test]
    fn test_not_a_figure() {
        assert_eq!(find_block("```rust\nx\n```", 0), None);
        assert_eq!(find_block("```figures\nx\n```", 0), None);
        assert_eq!(find_block("``figure\nx\n``", 0), None);
        assert_eq!(find_block(" ```figure\nx\n```", 0), None);
        assert_eq!(find_block("```figure {a} b\nx\n```", 0), None);
    }

    #[test]
    fn test_unclosed_block() {
        assert_eq!(find_block("```figure\nx\n", 0), None);
        assert_eq!(find_block("```figure", 0), None);
    }

    #[test]
    fn test_comment_guard() {
        let text = "<!--\n```figure\nx\n```\n-->\n";
        assert_eq!(find_block(text, 0), None);
    }

    #[test]
    fn test_resume_from_offset() {
        let text = "```figure\na\n```\n```figure Two\nb\n```";
        let first = find_block(text, 0).unwrap();
        let second = find_block(text, first.range.end).unwrap();
        assert_eq!(second.title, Some("Two"));
        assert_eq!(second.range.end, text.len());
    }

    #[test]
    fn test_global_line() {
        assert_eq!(parse_global_line("{figure .x :numeric-ids=true}"), Some(".x :numeric-ids=true"));
        assert_eq!(parse_global_line("{FigureMark #id}  "), Some("#id"));
        assert_eq!(parse_global_line("{figure}"), Some(""));
        assert_eq!(parse_global_line("{figures .x}"), None);
        assert_eq!(parse_global_line(" {figure .x}"), None);
        assert_eq!(parse_global_line("{figure .x} trailing"), None);
        assert_eq!(parse_global_line("{figure a} b}"), None);
    }
}
