//! Incept presentation: showing FigureMark source as a highlighted figure.

use crate::attrs::SHARED_CLASS;
use crate::directives::{InceptScope, PROCESS_MODE};
use crate::fence::FigureBlock;
use crate::html::{escape_angles, strip_tags, unescape_angles};

/// Class added to figures rendered in incept mode.
pub const INCEPT_CLASS: &str = "incept";

/// Display lines of an incept figure plus the self-check result.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Incepted {
    pub lines: Vec<String>,
    /// Length difference when the markup does not reduce back to the source.
    pub mismatch: Option<isize>,
}

/// Build the incept display for `block`.
///
/// `body` is the already annotated body. `text` is the document the block
/// was found in.
pub(crate) fn incept(
    block: &FigureBlock<'_>,
    text: &str,
    body: Option<&str>,
    scope: InceptScope,
) -> Incepted {
    let body_lines = body.map(|b| b.split('\n').map(str::to_owned).collect::<Vec<_>>());

    match scope {
        InceptScope::Content => {
            let lines = body_lines.unwrap_or_default();
            let mismatch = verify(&lines.join("\n"), block.body.unwrap_or(""));
            Incepted { lines, mismatch }
        }
        InceptScope::All => {
            let closing = highlight(&escape_angles(block.closing));
            let mut checked = vec![opening_markup(block, false)];
            let mut lines = vec![opening_markup(block, true)];
            for line in body_lines.into_iter().flatten() {
                checked.push(line.clone());
                lines.push(line);
            }
            checked.push(closing.clone());
            lines.push(closing);

            let mismatch = verify(&checked.join("\n"), block.source(text));
            Incepted { lines, mismatch }
        }
    }
}

fn highlight(content: &str) -> String {
    format!(r#"<span class="{SHARED_CLASS} highlight">{content}</span>"#)
}

/// Markup for the opening fence line.
///
/// With `trim` set, the `:process-mode=incept` directive is left out of the
/// displayed attribute list.
fn opening_markup(block: &FigureBlock<'_>, trim: bool) -> String {
    let line = block.opening;
    let mut markup = highlight(&escape_angles(&line[..block.keyword_end]));

    let Some(attrs) = block.attrs.clone() else {
        markup.push_str(&escape_angles(&line[block.keyword_end..]));
        return markup;
    };

    markup.push_str(&escape_angles(&line[block.keyword_end..attrs.start]));
    let list = &line[attrs.start + 1..attrs.end - 1];
    if trim {
        let trimmed = trim_process_mode(list);
        if !trimmed.trim().is_empty() {
            markup.push_str(&highlight(&escape_angles(&format!("{{{trimmed}}}"))));
        }
    } else {
        markup.push_str(&highlight(&escape_angles(&line[attrs.clone()])));
    }
    markup.push_str(&escape_angles(&line[attrs.end..]));
    markup
}

/// Remove `:process-mode=incept` (optionally quoted) from an attribute list.
fn trim_process_mode(list: &str) -> String {
    let needle = format!(":{PROCESS_MODE}=");
    let mut result = String::with_capacity(list.len());
    let mut rest = list;

    while let Some(at) = rest.find(&needle) {
        let after = &rest[at + needle.len()..];
        let unquoted = after.trim_start_matches(['"', '\'']);
        let Some(tail) = unquoted.strip_prefix("incept") else {
            result.push_str(&rest[..at + needle.len()]);
            rest = after;
            continue;
        };
        let tail = tail.strip_prefix(['"', '\'']).unwrap_or(tail);
        result.push_str(&rest[..at]);
        rest = tail.trim_start();
    }

    result.push_str(rest);
    result.trim_end().to_owned()
}

/// Compare incept markup with the source it displays.
///
/// Markup only ever encodes angle brackets, so the comparison runs against
/// the encoded source and literal entities in the source stay untouched.
fn verify(markup: &str, source: &str) -> Option<isize> {
    let reduced = strip_tags(markup);
    if reduced == escape_angles(source) {
        return None;
    }
    Some(length_delta(unescape_angles(&reduced).len(), source.len()))
}

fn length_delta(actual: usize, expected: usize) -> isize {
    if actual >= expected {
        isize::try_from(actual - expected).unwrap_or(isize::MAX)
    } else {
        isize::try_from(expected - actual).map_or(isize::MIN, |d| -d)
    }
}
