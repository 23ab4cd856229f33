//! Inline span annotation.
//!
//! Rewrites annotated runs inside a block body into `<span>` markup:
//!
//! - `[subject]{annotation}`: bracketed subject
//! - `{3}`: numbered reference
//! - `"subject"{annotation}`: associative subject, for delimiter pairs
//! - `subject{annotation}`: implicit subject, the preceding token
//!
//! An annotation is either a mark (see [`MarkClassifier`]) or an attribute
//! list. Spans never cross a line break.

use std::collections::HashMap;

use crate::attrs::{AttributeSet, SHARED_CLASS};
use crate::directives::{FigureOptions, ProcessMode};
use crate::html::escape_angles;
use crate::marks::{MarkClassifier, REFERENCE_CLASS, is_numeric_reference};
use crate::warning::FigureWarning;

/// Class added to spans whose annotation is an attribute list.
pub const ATTRIBUTED_CLASS: &str = "attributed";

/// Class added to spans whose subject was not bracketed.
pub const IMPLICIT_CLASS: &str = "implicit";

/// Paired delimiters for associative subjects.
const PAIRED_DELIMITERS: [(&str, &str); 5] = [
    ("\\[", "\\]"),
    ("(", ")"),
    ("{", "}"),
    ("\u{2018}", "\u{2019}"),
    ("\u{201c}", "\u{201d}"),
];

/// Characters that never act as symmetric delimiters.
const NON_SYMMETRIC: &[char] = &[
    '[', ']', '{', '}', '(', ')', '<', '>', '\\', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}',
];

/// Annotated span found in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Span<'a> {
    Bracketed { subject: &'a str, annotation: &'a str },
    Reference { number: &'a str },
    Implicit { subject: &'a str, annotation: &'a str },
}

#[derive(Debug, PartialEq, Eq)]
struct Found<'a> {
    start: usize,
    end: usize,
    span: Span<'a>,
}

/// Annotate every span in `body`.
///
/// Literal text between spans has its angle brackets escaped. Scanning
/// resumes where each replacement ends, so generated markup is never
/// matched again.
pub(crate) fn annotate(
    body: &str,
    options: &FigureOptions,
    warnings: &mut Vec<FigureWarning>,
) -> String {
    let renderer = SpanRenderer {
        marks: MarkClassifier::new(&options.mark_types),
        incept: options.process_mode == ProcessMode::Incept,
    };
    let scanner = Scanner::new(body, options.associative);

    let mut output = String::with_capacity(body.len() * 2);
    let mut cursor = 0;

    while let Some(found) = scanner.find_span(cursor) {
        output.push_str(&escape_angles(&body[cursor..found.start]));
        output.push_str(&renderer.render(&found.span, warnings));
        cursor = found.end;
    }

    output.push_str(&escape_angles(&body[cursor..]));
    output
}

/// Span finder over one body.
///
/// Line ends, closing braces and delimiter partners are indexed up front, so
/// every candidate position costs a binary search or a map probe.
struct Scanner<'a> {
    text: &'a str,
    /// Offsets of `\n`.
    newlines: Vec<usize>,
    /// Offsets of `}`.
    close_braces: Vec<usize>,
    /// Offsets of unescaped `]` immediately followed by a valid annotation.
    bracket_closes: Vec<usize>,
    /// Associative opener offset to the end of its closing delimiter.
    partners: HashMap<usize, usize>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, associative: bool) -> Self {
        let mut scanner = Self {
            text,
            newlines: offsets(text, '\n'),
            close_braces: offsets(text, '}'),
            bracket_closes: Vec::new(),
            partners: HashMap::new(),
        };

        let bracket_closes = offsets(text, ']')
            .into_iter()
            .filter(|&close| {
                !is_escaped(text, close) && scanner.annotation_at(close + 1, true).is_some()
            })
            .collect();
        scanner.bracket_closes = bracket_closes;

        if associative {
            let mut line_start = 0;
            for line in text.split('\n') {
                index_paired(line, line_start, &mut scanner.partners);
                index_symmetric(line, line_start, &mut scanner.partners);
                line_start += line.len() + 1;
            }
        }

        scanner
    }

    /// Find the leftmost span starting at or after `from`.
    fn find_span(&self, from: usize) -> Option<Found<'a>> {
        let text = self.text;
        // Every position inside one token run shares the same run end, so a
        // failed token match rules out the rest of the run.
        let mut token_checked_until = from;

        for (offset, c) in text[from..].char_indices() {
            let i = from + offset;

            if c == '[' && !is_escaped(text, i)
                && let Some(found) = self.match_bracketed(i)
            {
                return Some(found);
            }

            if c == '{' && !is_escaped(text, i)
                && let Some(found) = match_reference(text, i)
            {
                return Some(found);
            }

            if let Some(found) = self.match_delimited(i) {
                return Some(found);
            }

            if i >= token_checked_until && is_token_char(c) {
                let end = i + text[i..]
                    .find(|c: char| !is_token_char(c))
                    .unwrap_or(text.len() - i);
                if let Some((annotation, span_end)) = self.annotation_at(end, false) {
                    return Some(Found {
                        start: i,
                        end: span_end,
                        span: Span::Implicit {
                            subject: &text[i..end],
                            annotation,
                        },
                    });
                }
                token_checked_until = end;
            }
        }

        None
    }

    fn line_end(&self, pos: usize) -> usize {
        next_at_or_after(&self.newlines, pos).unwrap_or(self.text.len())
    }

    /// Parse `{annotation}` at `pos`, returning the annotation and the offset
    /// after the closing brace.
    fn annotation_at(&self, pos: usize, allow_numeric: bool) -> Option<(&'a str, usize)> {
        let text = self.text;
        if !text[pos..].starts_with('{') || is_escaped(text, pos) {
            return None;
        }
        let close = next_at_or_after(&self.close_braces, pos + 1)?;
        if close >= self.line_end(pos) {
            return None;
        }
        let annotation = &text[pos + 1..close];
        if annotation.is_empty() || (!allow_numeric && is_numeric_reference(annotation)) {
            return None;
        }
        Some((annotation, close + 1))
    }

    /// `[subject]{annotation}` starting at `i`.
    fn match_bracketed(&self, i: usize) -> Option<Found<'a>> {
        let text = self.text;
        let limit = self.line_end(i);
        let subject_start = i + 1;
        let first = text[subject_start..limit].chars().next()?;

        let close = next_at_or_after(&self.bracket_closes, subject_start + first.len_utf8())?;
        if close >= limit {
            return None;
        }
        let (annotation, end) = self.annotation_at(close + 1, true)?;

        Some(Found {
            start: i,
            end,
            span: Span::Bracketed {
                subject: &text[subject_start..close],
                annotation,
            },
        })
    }

    /// Delimited subject starting at `i`, immediately followed by an
    /// annotation. The delimiters are part of the subject.
    fn match_delimited(&self, i: usize) -> Option<Found<'a>> {
        let subject_end = *self.partners.get(&i)?;
        let (annotation, end) = self.annotation_at(subject_end, false)?;

        Some(Found {
            start: i,
            end,
            span: Span::Implicit {
                subject: &self.text[i..subject_end],
                annotation,
            },
        })
    }
}

fn offsets(text: &str, c: char) -> Vec<usize> {
    text.match_indices(c).map(|(i, _)| i).collect()
}

/// First offset in the sorted `offsets` that is at least `pos`.
fn next_at_or_after(offsets: &[usize], pos: usize) -> Option<usize> {
    offsets.get(offsets.partition_point(|&o| o < pos)).copied()
}

fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && c != '[' && c != '{'
}

fn is_symmetric_delimiter(c: char) -> bool {
    !(c.is_alphanumeric() || c == '_' || c.is_whitespace() || NON_SYMMETRIC.contains(&c))
}

/// Whether the character at `i` is preceded by a backslash.
fn is_escaped(text: &str, i: usize) -> bool {
    text[..i].ends_with('\\')
}

/// `{n}` starting at `i`.
fn match_reference(text: &str, i: usize) -> Option<Found<'_>> {
    let content = &text[i + 1..];
    let len = content
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(content.len());
    let number = &content[..len];
    if !content[len..].starts_with('}') || !is_numeric_reference(number) {
        return None;
    }
    Some(Found {
        start: i,
        end: i + len + 2,
        span: Span::Reference { number },
    })
}

/// Record the partner of every paired opener on one line.
///
/// Pairs nest per delimiter kind and enclose at least one character.
fn index_paired(line: &str, line_start: usize, partners: &mut HashMap<usize, usize>) {
    let mut open = vec![Vec::new(); PAIRED_DELIMITERS.len()];

    for (pos, _) in line.char_indices() {
        let rest = &line[pos..];
        for (kind, (opener, closer)) in PAIRED_DELIMITERS.iter().enumerate() {
            if rest.starts_with(opener) {
                open[kind].push(pos);
            } else if rest.starts_with(closer)
                && let Some(start) = open[kind].pop()
                && pos > start + opener.len()
            {
                partners.insert(line_start + start, line_start + pos + closer.len());
            }
        }
    }
}

/// Record symmetric runs on one line.
///
/// A run of one punctuation character is closed by the next run of that
/// character at least as long; only a run of exactly the same length pairs.
fn index_symmetric(line: &str, line_start: usize, partners: &mut HashMap<usize, usize>) {
    let mut runs = Vec::new();
    let mut chars = line.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        while let Some((next, _)) = chars.next_if(|&(_, n)| n == c) {
            end = next + c.len_utf8();
        }
        if is_symmetric_delimiter(c) {
            runs.push((c, start, end));
        }
    }

    // Right to left, each stack keeps the runs still able to close an
    // earlier one: shorter runs behind a longer one never can.
    let mut closers: HashMap<char, Vec<(usize, usize)>> = HashMap::new();
    for &(c, start, end) in runs.iter().rev() {
        let stack = closers.entry(c).or_default();
        let len = end - start;
        while stack.last().is_some_and(|&(s, e)| e - s < len) {
            stack.pop();
        }
        if let Some(&(s, e)) = stack.last()
            && e - s == len
        {
            partners.insert(line_start + start, line_start + e);
        }
        stack.push((start, end));
    }
}

/// Renders spans in transform or incept presentation.
struct SpanRenderer<'a> {
    marks: MarkClassifier<'a>,
    incept: bool,
}

impl SpanRenderer<'_> {
    fn render(&self, span: &Span<'_>, warnings: &mut Vec<FigureWarning>) -> String {
        match *span {
            Span::Reference { number } => {
                let open = format!(
                    r#"<span class="{SHARED_CLASS} {REFERENCE_CLASS} {REFERENCE_CLASS}-{number}">"#
                );
                if self.incept {
                    format!("{open}{{</span>{number}{open}}}</span>")
                } else {
                    format!("{open}{number}</span>")
                }
            }
            Span::Bracketed {
                subject,
                annotation,
            } => {
                let open = self.annotation_open(annotation, false, warnings);
                let subject = escape_angles(subject);
                if self.incept {
                    let annotation = escape_angles(annotation);
                    format!("{open}[</span>{subject}{open}]{{</span>{annotation}{open}}}</span>")
                } else {
                    format!("{open}{subject}</span>")
                }
            }
            Span::Implicit {
                subject,
                annotation,
            } => {
                let subject = escape_angles(subject);
                if self.incept {
                    let open = self.annotation_open(annotation, false, warnings);
                    let annotation = escape_angles(annotation);
                    format!(
                        r#"<span class="{SHARED_CLASS} {IMPLICIT_CLASS}">{subject}</span>{open}{{</span>{annotation}{open}}}</span>"#
                    )
                } else {
                    let open = self.annotation_open(annotation, true, warnings);
                    format!("{open}{subject}</span>")
                }
            }
        }
    }

    /// Opening `<span>` tag for an annotation, mark or attribute list.
    fn annotation_open(
        &self,
        annotation: &str,
        implicit: bool,
        warnings: &mut Vec<FigureWarning>,
    ) -> String {
        if let Some(classes) = self.marks.classify(annotation) {
            let suffix = if implicit {
                format!(" {IMPLICIT_CLASS}")
            } else {
                String::new()
            };
            return format!(r#"<span class="{SHARED_CLASS} {classes}{suffix}">"#);
        }

        let mut attrs = AttributeSet::parse(annotation, warnings);
        attrs.push_class(ATTRIBUTED_CLASS);
        if implicit {
            attrs.push_class(IMPLICIT_CLASS);
        }
        attrs.settle();
        format!("<span{attrs}>")
    }
}
