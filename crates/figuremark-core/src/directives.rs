//! Directive resolution.
//!
//! Turns the directive map of a resolved [`AttributeSet`] into typed
//! [`FigureOptions`], applying defaults for anything left unset.

use std::collections::BTreeMap;

use crate::attrs::AttributeSet;

pub const FIG_NUM_FORMAT: &str = "fig-num-format";
pub const EMPTY_CAPTIONS: &str = "empty-captions";
pub const CAPTION_BEFORE: &str = "caption-before";
pub const LINK_CAPTION: &str = "link-caption";
pub const RETAIN_BLOCK: &str = "retain-block";
pub const PROCESS_MODE: &str = "process-mode";
pub const INCEPT_SCOPE: &str = "incept-scope";
pub const ASSOCIATIVE: &str = "associative";
pub const NUMERIC_IDS: &str = "numeric-ids";
pub const MARK_TYPE: &str = "mark-type";

const KNOWN_DIRECTIVES: [&str; 10] = [
    FIG_NUM_FORMAT,
    EMPTY_CAPTIONS,
    CAPTION_BEFORE,
    LINK_CAPTION,
    RETAIN_BLOCK,
    PROCESS_MODE,
    INCEPT_SCOPE,
    ASSOCIATIVE,
    NUMERIC_IDS,
    MARK_TYPE,
];

const DEFAULT_NUMBER_FORMAT: &str = "Fig. #";

/// Placeholder in `fig-num-format` replaced by the figure number.
const NUMBER_PLACEHOLDER: char = '#';

pub(crate) fn is_known_directive(name: &str) -> bool {
    KNOWN_DIRECTIVES.contains(&name)
}

/// Which parts of the caption link to the figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptionLink {
    #[default]
    Number,
    Title,
    All,
    None,
}

/// What to keep of the source block next to the rendered figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetainBlock {
    #[default]
    None,
    Comment,
    Indent,
}

/// How the block body is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessMode {
    /// Render annotations as semantic markup.
    #[default]
    Transform,
    /// Render the annotated source itself, syntax highlighted.
    Incept,
}

/// How much of the source block an incept figure displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InceptScope {
    /// Body lines only.
    #[default]
    Content,
    /// Body plus the opening and closing fence lines.
    All,
}

impl CaptionLink {
    fn from_directive(value: &str) -> Option<Self> {
        match value {
            "num" => Some(Self::Number),
            "title" => Some(Self::Title),
            "all" => Some(Self::All),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl RetainBlock {
    fn from_directive(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "comment" => Some(Self::Comment),
            "indent" => Some(Self::Indent),
            _ => None,
        }
    }
}

impl ProcessMode {
    fn from_directive(value: &str) -> Option<Self> {
        match value {
            "transform" => Some(Self::Transform),
            "incept" => Some(Self::Incept),
            _ => None,
        }
    }
}

impl InceptScope {
    fn from_directive(value: &str) -> Option<Self> {
        match value {
            "content" => Some(Self::Content),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Effective per-figure settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureOptions {
    /// Caption number label with the figure number substituted.
    pub number_label: String,
    pub empty_captions: bool,
    pub caption_before: bool,
    pub link_caption: CaptionLink,
    pub retain_block: RetainBlock,
    pub process_mode: ProcessMode,
    pub incept_scope: InceptScope,
    /// Whether delimited runs like `"quoted"{!}` form spans.
    pub associative: bool,
    /// Use `figure-<n>` ids even when a title is available.
    pub numeric_ids: bool,
    /// User-declared mark types: mark name to classes.
    pub mark_types: BTreeMap<String, Vec<String>>,
}

impl FigureOptions {
    /// Resolve options from a block's merged attributes.
    #[must_use]
    pub fn resolve(attrs: &AttributeSet, figure_number: usize) -> Self {
        let flag = |name: &str, default: bool| {
            attrs.directive(name).map_or(default, |v| v == "true")
        };
        let format = attrs
            .directive(FIG_NUM_FORMAT)
            .unwrap_or(DEFAULT_NUMBER_FORMAT);

        Self {
            number_label: format.replace(NUMBER_PLACEHOLDER, &figure_number.to_string()),
            empty_captions: flag(EMPTY_CAPTIONS, true),
            caption_before: flag(CAPTION_BEFORE, true),
            link_caption: attrs
                .directive(LINK_CAPTION)
                .and_then(CaptionLink::from_directive)
                .unwrap_or_default(),
            retain_block: attrs
                .directive(RETAIN_BLOCK)
                .and_then(RetainBlock::from_directive)
                .unwrap_or_default(),
            process_mode: attrs
                .directive(PROCESS_MODE)
                .and_then(ProcessMode::from_directive)
                .unwrap_or_default(),
            incept_scope: attrs
                .directive(INCEPT_SCOPE)
                .and_then(InceptScope::from_directive)
                .unwrap_or_default(),
            associative: flag(ASSOCIATIVE, true),
            numeric_ids: flag(NUMERIC_IDS, false),
            mark_types: attrs.mark_types.clone(),
        }
    }
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self::resolve(&AttributeSet::new(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolve(raw: &str, number: usize) -> FigureOptions {
        let mut warnings = Vec::new();
        FigureOptions::resolve(&AttributeSet::parse(raw, &mut warnings), number)
    }

    #[test]
    fn test_defaults() {
        let options = resolve("", 4);
        assert_eq!(options.number_label, "Fig. 4");
        assert!(options.empty_captions);
        assert!(options.caption_before);
        assert_eq!(options.link_caption, CaptionLink::Number);
        assert_eq!(options.retain_block, RetainBlock::None);
        assert_eq!(options.process_mode, ProcessMode::Transform);
        assert_eq!(options.incept_scope, InceptScope::Content);
        assert!(options.associative);
        assert!(!options.numeric_ids);
        assert!(options.mark_types.is_empty());
    }

    #[test]
    fn test_number_format() {
        let options = resolve(r#":fig-num-format="Figure #:""#, 12);
        assert_eq!(options.number_label, "Figure 12:");
    }

    #[test]
    fn test_booleans_require_literal_true() {
        let options = resolve(":empty-captions=yes :caption-before=false :numeric-ids=true", 1);
        assert!(!options.empty_captions);
        assert!(!options.caption_before);
        assert!(options.numeric_ids);
    }

    #[test]
    fn test_enums() {
        let options = resolve(
            ":link-caption=all :retain-block=indent :process-mode=incept :incept-scope=all",
            1,
        );
        assert_eq!(options.link_caption, CaptionLink::All);
        assert_eq!(options.retain_block, RetainBlock::Indent);
        assert_eq!(options.process_mode, ProcessMode::Incept);
        assert_eq!(options.incept_scope, InceptScope::All);
    }

    #[test]
    fn test_unrecognised_enum_falls_back() {
        let options = resolve(":link-caption=everything :process-mode=magic", 1);
        assert_eq!(options.link_caption, CaptionLink::Number);
        assert_eq!(options.process_mode, ProcessMode::Transform);
    }

    #[test]
    fn test_known_directives() {
        assert!(is_known_directive("mark-type"));
        assert!(is_known_directive("retain-block"));
        assert!(!is_known_directive("retain"));
    }
}
