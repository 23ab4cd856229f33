//! Attribute list parsing and merging.
//!
//! Parses the `{#id .class key="value" :directive=value}` syntax used on
//! figure fences, global directive lines and inline spans.

use std::collections::BTreeMap;
use std::fmt;

use crate::directives::{MARK_TYPE, is_known_directive};
use crate::warning::{FigureWarning, emit};

/// Class carried by every element FigureMark generates.
pub const SHARED_CLASS: &str = "figuremark";

/// Prefix that marks a key as a directive rather than an HTML attribute.
pub const DIRECTIVE_PREFIX: char = ':';

/// Reserved value meaning "clear this" instead of "set this".
pub const REMOVE_TOKEN: &str = "-:";

/// Parsed attribute list.
///
/// Holds the identifier, classes, HTML attributes and directives of one
/// figure or span, plus the user-declared mark types.
///
/// # Example
///
/// ```
/// use figuremark_core::AttributeSet;
///
/// let mut warnings = Vec::new();
/// let attrs = AttributeSet::parse(r#"#code .rust lang="en" :empty-captions=false"#, &mut warnings);
/// assert_eq!(attrs.id.as_deref(), Some("code"));
/// assert_eq!(attrs.classes, vec!["figuremark", "rust"]);
/// assert_eq!(attrs.attr("lang"), Some("en"));
/// assert_eq!(attrs.directive("empty-captions"), Some("false"));
/// assert!(warnings.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    /// Element identifier: `{#id}`.
    pub id: Option<String>,
    /// Ordered, unique class names: `{.class}`. Seeded with [`SHARED_CLASS`].
    pub classes: Vec<String>,
    /// HTML attributes: `{key="value"}`.
    pub attrs: BTreeMap<String, String>,
    /// Directives: `{:name=value}`, keyed without the prefix.
    pub directives: BTreeMap<String, String>,
    /// Mark types declared with `:mark-type`, keyed by mark name.
    pub mark_types: BTreeMap<String, Vec<String>>,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new()
    }
}

/// One recognised item of an attribute list.
#[derive(Debug, PartialEq, Eq)]
enum Item<'a> {
    /// `.name` (or the `-.name` removal shorthand, already rewritten).
    Class(String),
    /// `#name` (or the `-#name` removal shorthand, already rewritten).
    Id(String),
    /// `key=value` with surrounding quotes already stripped.
    Pair(&'a str, &'a str),
    /// A bare word or dotted class list: `a.b.c`.
    Bare(&'a str),
}

impl AttributeSet {
    /// Create an empty set carrying only the shared class.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: None,
            classes: vec![SHARED_CLASS.to_owned()],
            attrs: BTreeMap::new(),
            directives: BTreeMap::new(),
            mark_types: BTreeMap::new(),
        }
    }

    /// Parse an attribute list (without the surrounding braces).
    ///
    /// Unknown `:directive` keys are dropped and reported through `warnings`.
    /// Malformed input never fails: unrecognised characters are skipped.
    pub fn parse(raw: &str, warnings: &mut Vec<FigureWarning>) -> Self {
        let mut set = Self::new();

        for item in tokenize(raw) {
            match item {
                Item::Class(class) => set.push_class(&class),
                Item::Id(id) => set.id = Some(id),
                Item::Pair(key, value) => {
                    if let Some(name) = key.strip_prefix(DIRECTIVE_PREFIX) {
                        if name == MARK_TYPE {
                            set.declare_mark_types(value);
                        } else if name == REMOVE_TOKEN || is_known_directive(name) {
                            set.directives.insert(name.to_owned(), value.to_owned());
                        } else {
                            emit(
                                warnings,
                                FigureWarning::UnknownDirective {
                                    name: name.to_owned(),
                                },
                            );
                        }
                    } else {
                        set.attrs.insert(key.to_owned(), value.to_owned());
                    }
                }
                Item::Bare(word) => {
                    for class in word.split('.').filter(|c| !c.is_empty()) {
                        set.push_class(class);
                    }
                }
            }
        }

        set
    }

    /// Get an HTML attribute value by key.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Get a directive value by name (without the `:` prefix).
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives.get(name).map(String::as_str)
    }

    /// Append a class unless it is already present.
    pub fn push_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Set an HTML attribute, replacing any previous value.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_owned(), value.into());
    }

    /// Merge `other` into `self`, letting `other` win and honouring removals.
    ///
    /// This is how global directive lines accumulate: each new line can set,
    /// override or clear what earlier lines established.
    pub fn overwrite_merge(&mut self, other: &Self) {
        if let Some(id) = &other.id {
            match id.strip_prefix(REMOVE_TOKEN) {
                Some(target) => {
                    if target.is_empty() || self.id.as_deref() == Some(target) {
                        self.id = None;
                    }
                }
                None => self.id = Some(id.clone()),
            }
        }

        overwrite_classes(&mut self.classes, &other.classes);
        overwrite_map(&mut self.attrs, &other.attrs);
        overwrite_map(&mut self.directives, &other.directives);

        if other.mark_types.contains_key(REMOVE_TOKEN) {
            self.mark_types.clear();
        }
        for (mark, classes) in &other.mark_types {
            if mark == REMOVE_TOKEN {
                continue;
            }
            let list = self.mark_types.entry(mark.clone()).or_default();
            overwrite_classes(list, classes);
            if list.is_empty() {
                self.mark_types.remove(mark);
            }
        }
    }

    /// Fill gaps in `self` from `other` without overriding anything `self` sets.
    ///
    /// Removal markers held by `self` block the matching inherited value and
    /// are consumed, so the result never carries a removal token.
    pub fn fill_merge(&mut self, other: &Self) {
        self.id = match self.id.take() {
            None => other.id.clone(),
            Some(id) => match id.strip_prefix(REMOVE_TOKEN) {
                Some(target) if target.is_empty() || other.id.as_deref() == Some(target) => None,
                Some(_) => other.id.clone(),
                None => Some(id),
            },
        };

        let own = std::mem::take(&mut self.classes);
        self.classes = fill_classes(own, &other.classes);

        fill_map(&mut self.attrs, &other.attrs);
        fill_map(&mut self.directives, &other.directives);

        let cleared = self.mark_types.remove(REMOVE_TOKEN).is_some();
        let mut merged = if cleared {
            BTreeMap::new()
        } else {
            other.mark_types.clone()
        };
        for (mark, classes) in std::mem::take(&mut self.mark_types) {
            let inherited = merged.remove(&mark).unwrap_or_default();
            let list = fill_classes(classes, &inherited);
            if !list.is_empty() {
                merged.insert(mark, list);
            }
        }
        self.mark_types = merged;
    }

    /// Consume any removal markers left in a freshly parsed set.
    ///
    /// Used for span attribute lists, which have nothing to inherit from.
    pub fn settle(&mut self) {
        self.fill_merge(&Self {
            classes: Vec::new(),
            ..Self::new()
        });
    }

    /// Parse a `:mark-type` value: `name:class.class, other:class`.
    fn declare_mark_types(&mut self, value: &str) {
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry == REMOVE_TOKEN {
                self.mark_types.insert(REMOVE_TOKEN.to_owned(), Vec::new());
                continue;
            }
            let Some((name, classes)) = entry.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let list = self.mark_types.entry(name.to_owned()).or_default();
            let classes = classes.trim();
            if classes == REMOVE_TOKEN {
                list.clear();
                list.push(REMOVE_TOKEN.to_owned());
                continue;
            }
            for class in classes.split('.').filter(|c| !c.is_empty()) {
                if !list.iter().any(|c| c == class) {
                    list.push(class.to_owned());
                }
            }
        }
    }
}

impl fmt::Display for AttributeSet {
    /// Render as HTML attributes, each preceded by a space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.id {
            write!(f, r#" id="{id}""#)?;
        }
        if !self.classes.is_empty() {
            write!(f, r#" class="{}""#, self.classes.join(" "))?;
        }
        for (key, value) in &self.attrs {
            write!(f, r#" {key}="{value}""#)?;
        }
        Ok(())
    }
}

/// Apply `incoming` classes with removal semantics.
fn overwrite_classes(list: &mut Vec<String>, incoming: &[String]) {
    for class in incoming {
        if class == REMOVE_TOKEN {
            list.clear();
        } else if let Some(target) = class.strip_prefix(REMOVE_TOKEN) {
            list.retain(|c| c != target);
        } else if !list.contains(class) {
            list.push(class.clone());
        }
    }
}

/// Settle `own` (which may hold removal markers) on top of `inherited`.
fn fill_classes(own: Vec<String>, inherited: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(own.len() + inherited.len());
    let mut blocked: Vec<String> = Vec::new();
    let mut block_all = false;

    for class in own {
        if class == REMOVE_TOKEN {
            block_all = true;
            kept.clear();
        } else if let Some(target) = class.strip_prefix(REMOVE_TOKEN) {
            kept.retain(|c| c != target);
            blocked.push(target.to_owned());
        } else if !kept.contains(&class) {
            kept.push(class);
        }
    }

    if !block_all {
        for class in inherited {
            if !blocked.contains(class) && !kept.contains(class) {
                kept.push(class.clone());
            }
        }
    }

    kept
}

fn overwrite_map(own: &mut BTreeMap<String, String>, incoming: &BTreeMap<String, String>) {
    if incoming.contains_key(REMOVE_TOKEN) {
        own.clear();
    }
    for (key, value) in incoming {
        if key == REMOVE_TOKEN {
            continue;
        }
        if value == REMOVE_TOKEN {
            own.remove(key);
        } else {
            own.insert(key.clone(), value.clone());
        }
    }
}

fn fill_map(own: &mut BTreeMap<String, String>, inherited: &BTreeMap<String, String>) {
    let cleared = own.remove(REMOVE_TOKEN).is_some();
    let mut merged = if cleared {
        BTreeMap::new()
    } else {
        inherited.clone()
    };
    for (key, value) in std::mem::take(own) {
        if value == REMOVE_TOKEN {
            merged.remove(&key);
        } else {
            merged.insert(key, value);
        }
    }
    *own = merged;
}

/// Characters allowed in ids, classes and keys: `[\w:-]`.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':' || c == '-'
}

/// Characters allowed in a bare dotted class list: `[\w.-]`.
fn is_bare_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// Length in bytes of the leading run of characters matching `pred`.
fn run_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.find(|c: char| !pred(c)).unwrap_or(s.len())
}

/// Split an attribute list into items, skipping anything unrecognised.
fn tokenize(raw: &str) -> Vec<Item<'_>> {
    let mut items = Vec::new();
    let mut remaining = raw;

    while let Some(c) = remaining.chars().next() {
        // Removal shorthand: `-.class`, `-.`, `-#id`, `-#`
        if let Some(rest) = remaining
            .strip_prefix("-.")
            .or_else(|| remaining.strip_prefix("-#"))
        {
            let end = run_len(rest, is_name_char);
            let target = format!("{REMOVE_TOKEN}{}", &rest[..end]);
            items.push(if remaining.as_bytes()[1] == b'.' {
                Item::Class(target)
            } else {
                Item::Id(target)
            });
            remaining = &rest[end..];
            continue;
        }

        // Class or id: `.name`, `#name`
        if c == '.' || c == '#' {
            let end = run_len(&remaining[1..], is_name_char);
            if end > 0 {
                let name = remaining[1..=end].to_owned();
                items.push(if c == '.' {
                    Item::Class(name)
                } else {
                    Item::Id(name)
                });
                remaining = &remaining[end + 1..];
                continue;
            }
        }

        // Key-value: key="value", key='value' or key=value
        let key_len = run_len(remaining, is_name_char);
        if key_len > 0 && remaining[key_len..].starts_with('=') {
            let (value, rest) = split_value(&remaining[key_len + 1..]);
            items.push(Item::Pair(&remaining[..key_len], strip_quotes(value)));
            remaining = rest;
            continue;
        }

        // Bare word or dotted class list
        let bare_len = run_len(remaining, is_bare_char);
        if bare_len > 0 {
            items.push(Item::Bare(&remaining[..bare_len]));
            remaining = &remaining[bare_len..];
            continue;
        }

        // Skip unrecognised character
        remaining = &remaining[c.len_utf8()..];
    }

    items
}

/// Split the value of a key-value pair from the rest of the list.
///
/// Quoted values keep their quotes here; [`strip_quotes`] removes them.
fn split_value(s: &str) -> (&str, &str) {
    for quote in ['"', '\''] {
        if let Some(stripped) = s.strip_prefix(quote)
            && let Some(close) = stripped.find(quote)
        {
            let end = close + 2;
            return (&s[..end], &s[end..]);
        }
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c: char| c == '"' || c == '\'')
}
