//! Figure element assembly: identifiers, captions, content and retention.

use crate::attrs::{AttributeSet, SHARED_CLASS};
use crate::directives::{CaptionLink, FigureOptions, RetainBlock};
use crate::html::{escape_angles, slugify};

/// Identifier for a figure that was not given one explicitly.
pub(crate) fn identifier(title: Option<&str>, figure_number: usize, numeric: bool) -> String {
    let slug = title.filter(|_| !numeric).map(slugify).unwrap_or_default();
    if slug.is_empty() {
        format!("figure-{figure_number}")
    } else {
        slug
    }
}

/// Render the `<figcaption>`, or `None` when it should be omitted.
pub(crate) fn caption(options: &FigureOptions, id: &str, title: Option<&str>) -> Option<String> {
    if title.is_none() && !options.empty_captions {
        return None;
    }

    let number = &options.number_label;
    let title = escape_angles(title.unwrap_or(""));
    let link = format!(r##"<a href="#{id}">"##);

    let inner = match options.link_caption {
        CaptionLink::Number => format!(
            r#"<span class="figure-number">{link}{number}</a></span><span class="figure-title">{title}</span>"#
        ),
        CaptionLink::Title => format!(
            r#"<span class="figure-number">{number}</span><span class="figure-title">{link}{title}</a></span>"#
        ),
        CaptionLink::All => format!(
            r#"{link}<span class="figure-number">{number}</span><span class="figure-title">{title}</span></a>"#
        ),
        CaptionLink::None => format!(
            r#"<span class="figure-number">{number}</span><span class="figure-title">{title}</span>"#
        ),
    };

    Some(format!("<figcaption>{inner}</figcaption>"))
}

/// Wrap display lines in the figure content container.
pub(crate) fn content(lines: &[String]) -> String {
    let mut html = String::from(r#"<div class="figure-content">"#);
    for line in lines {
        html.push_str(&format!(r#"<span class="{SHARED_CLASS} line">{line}</span>"#));
        html.push('\n');
    }
    html.push_str("</div>");
    html
}

/// Assemble the `<figure>` element.
pub(crate) fn assemble(attrs: &AttributeSet, content: &str, caption: Option<&str>, before: bool) -> String {
    let inner = match caption {
        Some(caption) if before => format!("{caption}\n{content}"),
        Some(caption) => format!("{content}\n{caption}"),
        None => content.to_owned(),
    };
    format!("<figure{attrs}>{inner}</figure>")
}

/// Keep the source block next to the figure when requested.
pub(crate) fn retain(retain: RetainBlock, source: &str, figure: String) -> String {
    match retain {
        RetainBlock::None => figure,
        RetainBlock::Comment => format!("<!--\n{source}\n-->\n\n{figure}"),
        RetainBlock::Indent => {
            let indented: Vec<String> = source
                .trim_start()
                .split('\n')
                .map(|line| format!("\t{line}"))
                .collect();
            format!("{}\n\n{figure}", indented.join("\n"))
        }
    }
}
