//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod convert;

pub(crate) use check::CheckArgs;
pub(crate) use convert::ConvertArgs;

use std::path::Path;

use figuremark_config::{Config, DocumentSettings};
use figuremark_core::{DocumentContext, FigureWarning, Transformed, transform_document};

use crate::error::CliError;
use crate::output::Output;

/// What happened to one input file.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// The file was left alone.
    Skipped(&'static str),
    /// The file was transformed.
    Processed(Transformed),
}

/// Read and transform one file according to `config`.
///
/// Files whose extension is not configured are skipped, as are documents
/// whose enable flag resolves false unless `force` is set.
pub(crate) fn process_file(config: &Config, path: &Path, force: bool) -> Result<Outcome, CliError> {
    if !config.accepts(path) {
        return Ok(Outcome::Skipped("not a markup-text document"));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {e}", path.display()),
        ))
    })?;

    let settings = DocumentSettings::from_document(&text);
    if !force && !config.is_enabled_for(&settings) {
        return Ok(Outcome::Skipped("FigureMark disabled"));
    }

    let context = DocumentContext {
        title: settings.title.as_deref(),
        path: Some(path),
        defaults: config.defaults(),
    };
    Ok(Outcome::Processed(transform_document(&text, &context)))
}

/// Print each warning for a file.
pub(crate) fn report_warnings(output: &Output, path: &Path, warnings: &[FigureWarning]) {
    for warning in warnings {
        output.warning(&format!("{}: {warning}", path.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_process_file_transforms() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.md", "```figure\n[a]{+}\n```\n");

        let Outcome::Processed(result) = process_file(&Config::default(), &path, false).unwrap()
        else {
            panic!("expected document to be processed");
        };
        assert_eq!(result.figures, 1);
        assert!(result.text.contains(r#"<span class="figuremark insert">a</span>"#));
    }

    #[test]
    fn test_process_file_skips_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "main.rs", "```figure\nx\n```\n");

        let outcome = process_file(&Config::default(), &path, true).unwrap();
        assert!(matches!(outcome, Outcome::Skipped(_)));
    }

    #[test]
    fn test_process_file_respects_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "doc.md",
            "---\nfiguremark: false\n---\n```figure\nx\n```\n",
        );

        let outcome = process_file(&Config::default(), &path, false).unwrap();
        assert!(matches!(outcome, Outcome::Skipped(_)));

        let outcome = process_file(&Config::default(), &path, true).unwrap();
        assert!(matches!(outcome, Outcome::Processed(ref r) if r.figures == 1));
    }

    #[test]
    fn test_process_file_front_matter_enables() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "doc.md",
            "---\nfiguremark: true\n---\n```figure\nx\n```\n",
        );
        let mut config = Config::default();
        config.figuremark.enabled = false;

        let outcome = process_file(&config, &path, false).unwrap();
        assert!(matches!(outcome, Outcome::Processed(_)));
    }

    #[test]
    fn test_process_file_applies_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.md", "```figure\nx\n```\n");
        let mut config = Config::default();
        config.figuremark.defaults = r#":fig-num-format="Figure #""#.to_owned();

        let Outcome::Processed(result) = process_file(&config, &path, false).unwrap() else {
            panic!("expected document to be processed");
        };
        assert!(result.text.contains("Figure 1"));
    }

    #[test]
    fn test_process_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = process_file(&Config::default(), &dir.path().join("gone.md"), false)
            .unwrap_err();
        assert!(err.to_string().contains("gone.md"));
    }
}
