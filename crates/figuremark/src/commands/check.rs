//! `figuremark check` command implementation.

use std::path::PathBuf;

use clap::Args;
use figuremark_config::Config;

use super::{Outcome, process_file, report_warnings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Documents to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Fail when any warning is reported.
    #[arg(long)]
    strict: bool,

    /// Path to configuration file (default: auto-discover figuremark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (per-document summaries).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a file cannot be read, or
    /// `--strict` is set and warnings were reported.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        let mut figures = 0;
        let mut warnings = 0;
        for path in &self.files {
            match process_file(&config, path, false)? {
                Outcome::Skipped(reason) => {
                    output.info(&format!("Skipped {}: {reason}", path.display()));
                }
                Outcome::Processed(result) => {
                    report_warnings(&output, path, &result.warnings);
                    output.info(&format!(
                        "{}: {} figures, {} warnings",
                        path.display(),
                        result.figures,
                        result.warnings.len()
                    ));
                    figures += result.figures;
                    warnings += result.warnings.len();
                }
            }
        }

        if self.strict && warnings > 0 {
            return Err(CliError::Validation(format!(
                "{warnings} warnings reported (--strict)"
            )));
        }

        let summary = format!("{figures} figures, {warnings} warnings");
        if warnings > 0 {
            output.warning(&summary);
        } else {
            output.success(&summary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(content: &str, strict: bool) -> Result<(), CliError> {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("figuremark.toml");
        std::fs::write(&config, "").unwrap();
        let doc = dir.path().join("doc.md");
        std::fs::write(&doc, content).unwrap();

        let result = CheckArgs {
            files: vec![doc],
            strict,
            config: Some(config),
            verbose: false,
        }
        .execute();

        assert!(!dir.path().join("doc-converted.md").exists());
        result
    }

    #[test]
    fn test_check_clean_document() {
        assert!(check("```figure\n[a]{+}\n```\n", true).is_ok());
    }

    #[test]
    fn test_check_warnings_pass_without_strict() {
        assert!(check("```figure {:bogus=1}\nx\n```\n", false).is_ok());
    }

    #[test]
    fn test_check_strict_fails_on_warnings() {
        let err = check("```figure {:bogus=1}\nx\n```\n", true).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }
}
