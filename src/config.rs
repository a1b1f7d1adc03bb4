//! Configuration resolution for trec-report
//!
//! Layered resolution, highest priority first:
//! 1. Command-line argument (clap, with env fallbacks)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! The Gemini API key follows the same ordering minus the CLI tier: keys
//! do not belong on command lines.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse config file failed: {0}")]
    Parse(String),
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Directory holding `report.tex` and the static illustration images
    pub template_dir: PathBuf,
    /// Root directory for per-request scratch directories
    pub output_root: PathBuf,
    /// Gemini API key; `None` disables the AI analysis endpoint
    pub gemini_api_key: Option<String>,
    /// Concurrent image downloads per report
    pub download_concurrency: usize,
    /// Upload body limit in bytes
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            template_dir: PathBuf::from("latex"),
            output_root: std::env::temp_dir().join("trec-report"),
            gemini_api_key: None,
            download_concurrency: 8,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// On-disk TOML configuration (all fields optional)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub template_dir: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub download_concurrency: Option<usize>,
}

impl TomlConfig {
    /// Default config file location: `<config dir>/trec-report/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("trec-report").join("config.toml"))
    }

    /// Load the TOML config from `path`.
    ///
    /// A missing file is not an error: the service starts on defaults.
    /// A malformed file is surfaced so a typo does not silently drop
    /// configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

impl AppConfig {
    /// Merge CLI overrides over the TOML config over compiled defaults.
    pub fn resolve(
        cli_port: Option<u16>,
        cli_template_dir: Option<PathBuf>,
        cli_output_root: Option<PathBuf>,
        toml_config: &TomlConfig,
    ) -> Self {
        let defaults = Self::default();
        Self {
            port: cli_port.or(toml_config.port).unwrap_or(defaults.port),
            template_dir: cli_template_dir
                .or_else(|| toml_config.template_dir.clone())
                .unwrap_or(defaults.template_dir),
            output_root: cli_output_root
                .or_else(|| toml_config.output_root.clone())
                .unwrap_or(defaults.output_root),
            gemini_api_key: resolve_gemini_api_key(toml_config),
            download_concurrency: toml_config
                .download_concurrency
                .unwrap_or(defaults.download_concurrency),
            max_upload_bytes: defaults.max_upload_bytes,
        }
    }

    /// Path of the LaTeX report template
    pub fn template_path(&self) -> PathBuf {
        self.template_dir.join("report.tex")
    }
}

/// Resolve the Gemini API key: ENV → TOML.
///
/// Returns `None` when no valid key is configured; the AI analysis
/// endpoint then reports itself unavailable instead of failing startup.
pub fn resolve_gemini_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(GEMINI_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .gemini_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Gemini API key found in both {} and the config file. Using the environment variable.",
            GEMINI_API_KEY_ENV
        );
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("Gemini API key loaded from environment variable");
            Some(key)
        }
        (None, Some(key)) => {
            info!("Gemini API key loaded from config file");
            Some(key)
        }
        (None, None) => {
            info!("No Gemini API key configured; AI analysis disabled");
            None
        }
    }
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_toml_parse() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 9090
            template_dir = "/srv/templates"
            gemini_api_key = "k-123"
            download_concurrency = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.port, Some(9090));
        assert_eq!(config.template_dir, Some(PathBuf::from("/srv/templates")));
        assert_eq!(config.gemini_api_key.as_deref(), Some("k-123"));
        assert_eq!(config.download_concurrency, Some(4));
    }

    #[test]
    fn test_toml_parse_empty() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.port.is_none());
        assert!(config.output_root.is_none());
    }

    #[test]
    fn test_resolve_priority_cli_over_toml() {
        let toml_config = TomlConfig {
            port: Some(9090),
            template_dir: Some(PathBuf::from("/toml/templates")),
            ..Default::default()
        };
        let config = AppConfig::resolve(Some(7070), None, None, &toml_config);
        assert_eq!(config.port, 7070);
        assert_eq!(config.template_dir, PathBuf::from("/toml/templates"));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(None, None, None, &TomlConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.template_dir, PathBuf::from("latex"));
        assert_eq!(config.download_concurrency, 8);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_template_path() {
        let config = AppConfig::resolve(None, Some(PathBuf::from("/srv/t")), None, &TomlConfig::default());
        assert_eq!(config.template_path(), PathBuf::from("/srv/t/report.tex"));
    }
}
