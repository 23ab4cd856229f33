//! Configuration management for FigureMark.
//!
//! Parses `figuremark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. Per-document
//! overrides come from YAML front matter, see [`DocumentSettings`].

mod document;

pub use document::{DocumentSettings, split_front_matter};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the site-wide enable flag.
    pub enabled: Option<bool>,
    /// Override the output file-name suffix.
    pub suffix: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "figuremark.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transform settings.
    pub figuremark: FigureMarkConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[figuremark]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FigureMarkConfig {
    /// Whether documents are transformed when their front matter is silent.
    pub enabled: bool,
    /// Attribute list applied before any global directive line.
    pub defaults: String,
    /// File extensions treated as markup-text documents.
    pub extensions: Vec<String>,
}

impl Default for FigureMarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            defaults: String::new(),
            extensions: vec!["md".to_owned(), "markdown".to_owned()],
        }
    }
}

/// `[output]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the file stem of converted output.
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "-converted".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `figuremark.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(enabled) = settings.enabled {
            self.figuremark.enabled = enabled;
        }
        if let Some(suffix) = &settings.suffix {
            self.output.suffix.clone_from(suffix);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.figuremark.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "figuremark.extensions cannot be empty".to_owned(),
            ));
        }
        for extension in &self.figuremark.extensions {
            require_non_empty(extension, "figuremark.extensions entry")?;
        }
        require_non_empty(&self.output.suffix, "output.suffix")?;
        Ok(())
    }

    /// Whether a file's extension marks it as a markup-text document.
    ///
    /// Comparison ignores ASCII case and a leading dot in the configured value.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.figuremark
            .extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Resolve the enable flag for a document.
    ///
    /// Front matter wins over the site-wide default.
    #[must_use]
    pub fn is_enabled_for(&self, document: &DocumentSettings) -> bool {
        document.figuremark.unwrap_or(self.figuremark.enabled)
    }

    /// Default attribute list, or `None` when unset.
    #[must_use]
    pub fn defaults(&self) -> Option<&str> {
        Some(self.figuremark.defaults.trim()).filter(|d| !d.is_empty())
    }

    /// Output path for a converted document: `<stem><suffix>.<ext>` next to
    /// the input, or inside `dir` when given.
    #[must_use]
    pub fn output_path(&self, input: &Path, dir: Option<&Path>) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut name = format!("{stem}{}", self.output.suffix);
        if let Some(extension) = input.extension() {
            name.push('.');
            name.push_str(&extension.to_string_lossy());
        }

        match dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.figuremark.enabled);
        assert_eq!(config.figuremark.defaults, "");
        assert_eq!(config.figuremark.extensions, vec!["md", "markdown"]);
        assert_eq!(config.output.suffix, "-converted");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.figuremark.enabled);
        assert_eq!(config.output.suffix, "-converted");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[figuremark]
enabled = false
defaults = ":fig-num-format='Figure #'"
extensions = ["md", "txt"]

[output]
suffix = ".out"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.figuremark.enabled);
        assert_eq!(config.defaults(), Some(":fig-num-format='Figure #'"));
        assert_eq!(config.figuremark.extensions, vec!["md", "txt"]);
        assert_eq!(config.output.suffix, ".out");
    }

    #[test]
    fn test_defaults_blank_is_none() {
        let mut config = Config::default();
        config.figuremark.defaults = "   ".to_owned();
        assert_eq!(config.defaults(), None);
    }

    #[test]
    fn test_validate_empty_extensions() {
        let mut config = Config::default();
        config.figuremark.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("figuremark.extensions cannot be empty"));
    }

    #[test]
    fn test_validate_empty_extension_entry() {
        let mut config = Config::default();
        config.figuremark.extensions.push(String::new());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_suffix() {
        let mut config = Config::default();
        config.output.suffix = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.suffix cannot be empty"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figuremark.toml");
        std::fs::write(&path, "[output]\nsuffix = \"-fig\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.output.suffix, "-fig");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figuremark.toml");
        std::fs::write(&path, "[figuremark\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figuremark.toml");
        std::fs::write(&path, "[figuremark]\nextensions = []\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_apply_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figuremark.toml");
        std::fs::write(&path, "[figuremark]\nenabled = true\n").unwrap();

        let settings = CliSettings {
            enabled: Some(false),
            suffix: Some("-out".to_owned()),
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert!(!config.figuremark.enabled);
        assert_eq!(config.output.suffix, "-out");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(config.figuremark.enabled);
        assert_eq!(config.output.suffix, "-converted");
    }

    #[test]
    fn test_accepts_extension() {
        let config = Config::default();
        assert!(config.accepts(Path::new("docs/guide.md")));
        assert!(config.accepts(Path::new("README.MD")));
        assert!(config.accepts(Path::new("notes.markdown")));
        assert!(!config.accepts(Path::new("main.rs")));
        assert!(!config.accepts(Path::new("Makefile")));
    }

    #[test]
    fn test_is_enabled_for() {
        let mut config = Config::default();
        let silent = DocumentSettings::default();
        let off = DocumentSettings {
            figuremark: Some(false),
            ..DocumentSettings::default()
        };
        let on = DocumentSettings {
            figuremark: Some(true),
            ..DocumentSettings::default()
        };

        assert!(config.is_enabled_for(&silent));
        assert!(!config.is_enabled_for(&off));

        config.figuremark.enabled = false;
        assert!(!config.is_enabled_for(&silent));
        assert!(config.is_enabled_for(&on));
    }

    #[test]
    fn test_output_path() {
        let config = Config::default();
        assert_eq!(
            config.output_path(Path::new("docs/guide.md"), None),
            PathBuf::from("docs/guide-converted.md")
        );
        assert_eq!(
            config.output_path(Path::new("docs/guide.md"), Some(Path::new("out"))),
            PathBuf::from("out/guide-converted.md")
        );
        assert_eq!(
            config.output_path(Path::new("NOTES"), None),
            PathBuf::from("NOTES-converted")
        );
    }
}
