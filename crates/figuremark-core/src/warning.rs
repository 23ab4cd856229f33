//! Recoverable diagnostics.
//!
//! Nothing in the transform is fatal. Conditions worth reporting are recorded
//! as [`FigureWarning`] values and handed back to the caller alongside the
//! transformed text.

/// A non-fatal problem found while transforming a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FigureWarning {
    /// An attribute list used a `:directive` key outside the known set.
    #[error("Unknown directive ':{name}'. Ignoring.")]
    UnknownDirective {
        /// Directive key without the `:` prefix.
        name: String,
    },
    /// Incept output did not reduce back to the source block.
    #[error("Imperfect inception in figure {figure} (delta {delta})")]
    ImperfectInception {
        /// Figure number of the affected block.
        figure: usize,
        /// Length of the tag-stripped output minus length of the source.
        delta: isize,
    },
}

/// Log a warning and record it for the caller.
pub(crate) fn emit(sink: &mut Vec<FigureWarning>, warning: FigureWarning) {
    tracing::warn!("{warning}");
    sink.push(warning);
}
