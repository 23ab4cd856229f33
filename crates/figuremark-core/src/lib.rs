//! FigureMark: annotated figures for plain-text documents.
//!
//! FigureMark turns fenced blocks into numbered, captioned HTML `<figure>`
//! elements and rewrites inline annotations inside them into `<span>`
//! markup. Everything outside figure blocks passes through untouched, so the
//! transform runs before any Markdown renderer.
//!
//! # Syntax
//!
//! - ```` ```figure Title {#id .class key="v" :directive=value} ```` opens a block
//! - `{figure ...}` alone on a line sets attributes for all later blocks
//! - `[subject]{+}` marks a bracketed subject (`+ - / > !` are built-in marks)
//! - `word{.class}` annotates the preceding token with an attribute list
//! - `"some words"{!}` annotates a delimited run
//! - `{2}` inserts a numbered reference
//!
//! # Example
//!
//! ```
//! use figuremark_core::transform;
//!
//! let result = transform("```figure Setup\nrun [make]{!}\n```\n");
//! assert_eq!(result.figures, 1);
//! assert!(result.text.contains(r#"<span class="figuremark highlight">make</span>"#));
//! assert!(result.text.contains(r#"<span class="figure-title">Setup</span>"#));
//! ```

mod attrs;
mod directives;
mod fence;
mod figure;
mod html;
mod inception;
mod marks;
mod processor;
mod spans;
mod warning;

pub use attrs::{AttributeSet, DIRECTIVE_PREFIX, REMOVE_TOKEN, SHARED_CLASS};
pub use directives::{CaptionLink, FigureOptions, InceptScope, ProcessMode, RetainBlock};
pub use html::{escape_angles, slugify};
pub use inception::INCEPT_CLASS;
pub use marks::{BUILTIN_MARKS, MarkClassifier};
pub use processor::{DocumentContext, FigureProcessor, Transformed, transform, transform_document};
pub use spans::{ATTRIBUTED_CLASS, IMPLICIT_CLASS};
pub use warning::FigureWarning;
