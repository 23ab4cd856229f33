//! `figuremark convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use figuremark_config::{CliSettings, Config};

use super::{Outcome, process_file, report_warnings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Documents to convert.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory for converted files (default: alongside each input).
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write converted documents to stdout instead of files.
    #[arg(long)]
    stdout: bool,

    /// Convert even when front matter or config disables FigureMark.
    #[arg(long)]
    force: bool,

    /// File-name suffix for converted output (overrides config).
    #[arg(long)]
    suffix: Option<String>,

    /// Path to configuration file (default: auto-discover figuremark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (per-document summaries).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a file cannot be read or
    /// written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            enabled: None,
            suffix: self.suffix,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(dir) = &self.output {
            std::fs::create_dir_all(dir)?;
        }

        let mut converted = 0;
        for path in &self.files {
            let result = match process_file(&config, path, self.force)? {
                Outcome::Skipped(reason) => {
                    output.info(&format!("Skipped {}: {reason}", path.display()));
                    continue;
                }
                Outcome::Processed(result) => result,
            };

            report_warnings(&output, path, &result.warnings);

            if self.stdout {
                output.document(&result.text);
            } else {
                let target = config.output_path(path, self.output.as_deref());
                std::fs::write(&target, &result.text)?;
                output.success(&format!(
                    "Converted {} ({} figures) -> {}",
                    path.display(),
                    result.figures,
                    target.display()
                ));
            }
            converted += 1;
        }

        output.highlight(&format!(
            "{converted} of {} files converted",
            self.files.len()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn args(files: Vec<PathBuf>, config: &Path) -> ConvertArgs {
        ConvertArgs {
            files,
            output: None,
            stdout: false,
            force: false,
            suffix: None,
            config: Some(config.to_path_buf()),
            verbose: false,
        }
    }

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("figuremark.toml");
        std::fs::write(&config, "").unwrap();
        let doc = dir.path().join("guide.md");
        std::fs::write(&doc, "Intro\n\n```figure Example\nx{!}\n```\n").unwrap();
        (dir, config, doc)
    }

    #[test]
    fn test_convert_writes_alongside_input() {
        let (dir, config, doc) = setup();

        args(vec![doc.clone()], &config).execute().unwrap();

        let converted = std::fs::read_to_string(dir.path().join("guide-converted.md")).unwrap();
        assert!(converted.starts_with("Intro\n\n<figure id=\"example\""));
        assert_eq!(
            std::fs::read_to_string(&doc).unwrap(),
            "Intro\n\n```figure Example\nx{!}\n```\n"
        );
    }

    #[test]
    fn test_convert_to_output_dir_with_suffix() {
        let (dir, config, doc) = setup();
        let out = dir.path().join("out");

        let mut convert = args(vec![doc], &config);
        convert.output = Some(out.clone());
        convert.suffix = Some(".fig".to_owned());
        convert.execute().unwrap();

        assert!(out.join("guide.fig.md").exists());
    }

    #[test]
    fn test_convert_skips_disabled_document() {
        let (dir, config, _) = setup();
        let doc = dir.path().join("off.md");
        std::fs::write(&doc, "---\nfiguremark: false\n---\n```figure\nx\n```\n").unwrap();

        args(vec![doc], &config).execute().unwrap();

        assert!(!dir.path().join("off-converted.md").exists());
    }

    #[test]
    fn test_convert_missing_file_fails() {
        let (dir, config, _) = setup();
        let result = args(vec![dir.path().join("missing.md")], &config).execute();
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
