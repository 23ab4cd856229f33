//! Mark classification.
//!
//! A span annotation is either a mark (a short symbol or declared name that
//! maps to CSS classes) or an attribute list.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Built-in marks and the class each one produces.
pub const BUILTIN_MARKS: [(&str, &str); 5] = [
    ("+", "insert"),
    ("-", "remove"),
    ("/", "comment"),
    (">", "result"),
    ("!", "highlight"),
];

/// Resolves annotation text to mark classes.
///
/// Declared mark types are consulted before the built-ins, so a document can
/// restyle `+` or `!` as well as add new names.
#[derive(Debug, Clone, Copy)]
pub struct MarkClassifier<'a> {
    custom: &'a BTreeMap<String, Vec<String>>,
}

impl<'a> MarkClassifier<'a> {
    #[must_use]
    pub fn new(custom: &'a BTreeMap<String, Vec<String>>) -> Self {
        Self { custom }
    }

    /// Return the space-joined classes for `annotation`, or `None` when it
    /// should be read as an attribute list.
    ///
    /// A bare number marks its subject as a reference to that number.
    #[must_use]
    pub fn classify(&self, annotation: &str) -> Option<Cow<'a, str>> {
        let annotation = annotation.trim();
        if let Some(classes) = self.custom.get(annotation)
            && !classes.is_empty()
        {
            return Some(Cow::Owned(classes.join(" ")));
        }
        if let Some((_, class)) = BUILTIN_MARKS.iter().find(|(mark, _)| *mark == annotation) {
            return Some(Cow::Borrowed(*class));
        }
        is_numeric_reference(annotation)
            .then(|| Cow::Owned(format!("{REFERENCE_CLASS} {REFERENCE_CLASS}-{annotation}")))
    }
}

/// Class carried by numbered references and number-marked spans.
pub(crate) const REFERENCE_CLASS: &str = "reference";

/// Digits, `.` and `-`, with at least one digit.
pub(crate) fn is_numeric_reference(content: &str) -> bool {
    content
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        && content.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_marks() {
        let custom = BTreeMap::new();
        let marks = MarkClassifier::new(&custom);
        assert_eq!(marks.classify("+").as_deref(), Some("insert"));
        assert_eq!(marks.classify("-").as_deref(), Some("remove"));
        assert_eq!(marks.classify("/").as_deref(), Some("comment"));
        assert_eq!(marks.classify(">").as_deref(), Some("result"));
        assert_eq!(marks.classify(" ! ").as_deref(), Some("highlight"));
    }

    #[test]
    fn test_attribute_list_is_not_a_mark() {
        let custom = BTreeMap::new();
        let marks = MarkClassifier::new(&custom);
        assert_eq!(marks.classify(".note"), None);
        assert_eq!(marks.classify("++"), None);
    }

    #[test]
    fn test_custom_marks_take_precedence() {
        let custom = BTreeMap::from([
            ("tip".to_owned(), vec!["note".to_owned(), "aside".to_owned()]),
            ("+".to_owned(), vec!["added".to_owned()]),
        ]);
        let marks = MarkClassifier::new(&custom);
        assert_eq!(marks.classify("tip").as_deref(), Some("note aside"));
        assert_eq!(marks.classify("+").as_deref(), Some("added"));
        assert_eq!(marks.classify("-").as_deref(), Some("remove"));
    }

    #[test]
    fn test_bare_number_is_reference() {
        let custom = BTreeMap::new();
        let marks = MarkClassifier::new(&custom);
        assert_eq!(marks.classify("3").as_deref(), Some("reference reference-3"));
        assert_eq!(marks.classify(" 1.2 ").as_deref(), Some("reference reference-1.2"));
        assert_eq!(marks.classify(".-"), None);
    }

    #[test]
    fn test_numeric_reference_needs_digit() {
        assert!(is_numeric_reference("2-4"));
        assert!(!is_numeric_reference("-"));
        assert!(!is_numeric_reference("3a"));
    }
}
