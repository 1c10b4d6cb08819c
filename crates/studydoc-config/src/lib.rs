//! Configuration management for studydoc.
//!
//! Parses `studydoc.toml` with serde and discovers it in the working
//! directory or its parents. Every section is optional.
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` (error if unset) and `${VAR:-default}`.
//!
//! Expanded fields:
//! - `pdf.engine_url`
//! - `pdf.header_title`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "studydoc.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the conversion service URL.
    pub engine_url: Option<String>,
    /// Override the render timeout.
    pub timeout_secs: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markup: MarkupConfig,
    pub pdf: PdfConfig,
    pub consent: ConsentConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markup compiler configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Custom tags kept as markup. `None` means the consent widget tags.
    pub allowed_tags: Option<Vec<String>>,
    /// Whether attribute-free inline formatting tags (`<b>`, `<i>`, ...)
    /// pass through.
    pub inline_formatting: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            allowed_tags: None,
            inline_formatting: true,
        }
    }
}

/// PDF rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Base URL of the Chromium conversion service.
    pub engine_url: String,
    /// Upper bound for one render, in seconds.
    pub timeout_secs: u64,
    pub margin_top: String,
    pub margin_bottom: String,
    pub margin_left: String,
    pub margin_right: String,
    /// Text in the page header.
    pub header_title: String,
    /// Document language of the print page.
    pub lang: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            engine_url: "http://localhost:3000".to_owned(),
            timeout_secs: 30,
            margin_top: "3cm".to_owned(),
            margin_bottom: "4cm".to_owned(),
            margin_left: "2cm".to_owned(),
            margin_right: "2cm".to_owned(),
            header_title: "PIA".to_owned(),
            lang: "de".to_owned(),
        }
    }
}

impl PdfConfig {
    /// Render timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Consent widget configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    pub labels: LabelsConfig,
}

/// Label overrides for printed consent widgets.
///
/// Unset labels keep their built-in text.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelsConfig {
    pub yes: Option<String>,
    pub no: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub location: Option<String>,
    pub birthdate: Option<String>,
    pub date: Option<String>,
    pub consent_on: Option<String>,
    pub compliance: Option<String>,
    pub page: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
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
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`pdf.engine_url`").
        field: String,
        /// Error message (e.g., "${`GOTENBERG_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `studydoc.toml` in the current directory and its parents, falling
    /// back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if
    /// parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
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

    /// Search for the config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, expanded or
    /// validated.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.engine_url {
            self.pdf.engine_url.clone_from(url);
        }
        if let Some(timeout) = settings.timeout_secs {
            self.pdf.timeout_secs = timeout;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_markup()?;
        self.validate_pdf()?;
        Ok(())
    }

    fn validate_markup(&self) -> Result<(), ConfigError> {
        for tag in self.markup.allowed_tags.iter().flatten() {
            require_non_empty(tag, "markup.allowed_tags")?;
            // Anything else could shadow a standard HTML element
            if !tag.contains('-') {
                return Err(ConfigError::Validation(format!(
                    "markup.allowed_tags entry `{tag}` is not a custom element name"
                )));
            }
        }
        Ok(())
    }

    fn validate_pdf(&self) -> Result<(), ConfigError> {
        let pdf = &self.pdf;
        require_non_empty(&pdf.engine_url, "pdf.engine_url")?;
        require_http_url(&pdf.engine_url, "pdf.engine_url")?;

        if pdf.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "pdf.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&pdf.margin_top, "pdf.margin_top")?;
        require_non_empty(&pdf.margin_bottom, "pdf.margin_bottom")?;
        require_non_empty(&pdf.margin_left, "pdf.margin_left")?;
        require_non_empty(&pdf.margin_right, "pdf.margin_right")?;
        require_non_empty(&pdf.lang, "pdf.lang")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.pdf.engine_url = expand::expand_env(&self.pdf.engine_url, "pdf.engine_url")?;
        self.pdf.header_title = expand::expand_env(&self.pdf.header_title, "pdf.header_title")?;
        Ok(())
    }
}
