//! Document-level driver.
//!
//! Finds figure blocks, tracks global directive lines between them, and
//! splices each rendered figure in place of its source block.

use std::path::Path;

use crate::attrs::AttributeSet;
use crate::directives::{FigureOptions, ProcessMode};
use crate::fence::{FigureBlock, find_block, parse_global_line};
use crate::figure;
use crate::html::{count_figures, unescape_syntax};
use crate::inception::{INCEPT_CLASS, incept};
use crate::spans::annotate;
use crate::warning::{FigureWarning, emit};

/// Converts FigureMark blocks in a document to HTML figures.
///
/// Each call to [`process`](Self::process) is independent: global directives
/// and figure numbering start fresh from the configured defaults.
///
/// # Example
///
/// ```
/// use figuremark_core::FigureProcessor;
///
/// let mut processor = FigureProcessor::new().with_defaults(":link-caption=none");
/// let output = processor.process("```figure Demo\nx = [1]{+}\n```\n");
///
/// assert!(output.starts_with(r#"<figure id="demo" class="figuremark" data-fignum="1">"#));
/// assert!(output.contains(r#"<span class="figuremark insert">1</span>"#));
/// assert_eq!(processor.figure_count(), 1);
/// assert!(processor.warnings().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct FigureProcessor {
    defaults: String,
    warnings: Vec<FigureWarning>,
    figures: usize,
}

impl FigureProcessor {
    /// Create a processor with no default attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set attributes applied as if a global directive line opened every
    /// document.
    #[must_use]
    pub fn with_defaults(mut self, raw: impl Into<String>) -> Self {
        self.defaults = raw.into();
        self
    }

    /// Transform every figure block in `input`.
    ///
    /// Returns `input` unchanged when it contains no figure blocks.
    pub fn process(&mut self, input: &str) -> String {
        self.warnings.clear();
        self.figures = 0;

        let mut globals = AttributeSet::new();
        if !self.defaults.trim().is_empty() {
            let defaults = AttributeSet::parse(&self.defaults, &mut self.warnings);
            globals.overwrite_merge(&defaults);
        }

        let mut output = String::with_capacity(input.len() * 2);
        let mut cursor = 0;
        let mut figure_number = 0;

        while let Some(block) = find_block(input, cursor) {
            let preamble = &input[cursor..block.range.start];
            figure_number += count_figures(preamble) + 1;

            output.push_str(&self.apply_globals(preamble, &mut globals));
            output.push_str(&self.render_block(input, &block, &globals, figure_number));

            cursor = block.range.end;
            self.figures += 1;
        }

        if self.figures == 0 {
            return input.to_owned();
        }

        output.push_str(&self.apply_globals(&input[cursor..], &mut globals));
        output
    }

    /// Warnings recorded by the last [`process`](Self::process) call.
    #[must_use]
    pub fn warnings(&self) -> &[FigureWarning] {
        &self.warnings
    }

    /// Number of blocks transformed by the last [`process`](Self::process) call.
    #[must_use]
    pub fn figure_count(&self) -> usize {
        self.figures
    }

    /// Consume the processor, returning its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<FigureWarning> {
        self.warnings
    }

    /// Fold global directive lines in `segment` into `globals`, dropping them
    /// from the output but keeping their line breaks.
    fn apply_globals(&mut self, segment: &str, globals: &mut AttributeSet) -> String {
        let mut output = String::with_capacity(segment.len());

        for line in segment.split_inclusive('\n') {
            let content = line.strip_suffix('\n').unwrap_or(line);
            match parse_global_line(content) {
                Some(raw) => {
                    globals.overwrite_merge(&AttributeSet::parse(raw, &mut self.warnings));
                    output.push_str(&line[content.len()..]);
                }
                None => output.push_str(line),
            }
        }

        output
    }

    fn render_block(
        &mut self,
        text: &str,
        block: &FigureBlock<'_>,
        globals: &AttributeSet,
        figure_number: usize,
    ) -> String {
        // Resolve
        let mut attrs = AttributeSet::parse(block.attributes().unwrap_or(""), &mut self.warnings);
        attrs.fill_merge(globals);
        let options = FigureOptions::resolve(&attrs, figure_number);

        let id = match &attrs.id {
            Some(id) => id.clone(),
            None => {
                let id = figure::identifier(block.title, figure_number, options.numeric_ids);
                attrs.id = Some(id.clone());
                id
            }
        };
        attrs.set_attr("data-fignum", figure_number.to_string());

        // Annotate
        let body = block
            .body
            .map(|body| annotate(body, &options, &mut self.warnings));

        let lines = if options.process_mode == ProcessMode::Incept {
            attrs.push_class(INCEPT_CLASS);
            let incepted = incept(block, text, body.as_deref(), options.incept_scope);
            if let Some(delta) = incepted.mismatch {
                emit(
                    &mut self.warnings,
                    FigureWarning::ImperfectInception {
                        figure: figure_number,
                        delta,
                    },
                );
            }
            incepted.lines
        } else {
            body.map(|b| b.split('\n').map(str::to_owned).collect())
                .unwrap_or_default()
        };

        // Assemble
        let content = unescape_syntax(&figure::content(&lines));
        let caption = figure::caption(&options, &id, block.title);
        let html = figure::assemble(&attrs, &content, caption.as_deref(), options.caption_before);

        tracing::debug!(figure = figure_number, id = %id, "Rendered figure");

        figure::retain(options.retain_block, block.source(text), html)
    }
}

/// Describes the document being transformed, for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentContext<'a> {
    /// Document title, typically from front matter.
    pub title: Option<&'a str>,
    /// Source path of the document.
    pub path: Option<&'a Path>,
    /// Default attributes applied before any global directive line.
    pub defaults: Option<&'a str>,
}

/// Result of transforming one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// Document text with every figure block rendered.
    pub text: String,
    /// Number of figure blocks converted.
    pub figures: usize,
    /// Diagnostics raised while processing, in document order.
    pub warnings: Vec<FigureWarning>,
}

/// Transform a document with default settings.
#[must_use]
pub fn transform(text: &str) -> Transformed {
    transform_document(text, &DocumentContext::default())
}

/// Transform a document and log a summary naming it.
#[must_use]
pub fn transform_document(text: &str, context: &DocumentContext<'_>) -> Transformed {
    let mut processor = FigureProcessor::new();
    if let Some(defaults) = context.defaults {
        processor = processor.with_defaults(defaults);
    }

    let output = processor.process(text);
    let figures = processor.figure_count();
    let title = context.title.unwrap_or("Untitled");
    let path = context
        .path
        .map_or_else(|| "no path".to_owned(), |p| p.display().to_string());

    if figures > 0 {
        tracing::info!("Processed {figures} FigureMark blocks in \"{title}\" ({path})");
    } else {
        tracing::debug!(title, path = %path, "No FigureMark blocks found");
    }

    Transformed {
        text: output,
        figures,
        warnings: processor.into_warnings(),
    }
}
