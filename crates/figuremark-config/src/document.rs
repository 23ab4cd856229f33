//! Per-document settings from YAML front matter.
//!
//! A document may open with a front matter block:
//!
//! ```text
//! ---
//! title: Installation
//! figuremark: false
//! ---
//! ```

use serde::Deserialize;

const DELIMITER: &str = "---";

/// Front matter fields FigureMark reads.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentSettings {
    /// Per-document enable flag. `None` defers to the site-wide default.
    pub figuremark: Option<bool>,
    /// Document title, used in diagnostics.
    pub title: Option<String>,
}

impl DocumentSettings {
    /// Read settings from a document's front matter.
    ///
    /// Returns defaults when there is no front matter or it is not valid
    /// YAML for these fields.
    #[must_use]
    pub fn from_document(text: &str) -> Self {
        let Some(yaml) = split_front_matter(text) else {
            return Self::default();
        };
        let trimmed = yaml.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        serde_yaml::from_str(trimmed).unwrap_or_default()
    }
}

/// Extract the YAML between a leading `---` line and the next `---` line.
#[must_use]
pub fn split_front_matter(text: &str) -> Option<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Some(&text[start..offset]);
        }
        offset += line.len();
    }
    None
}
