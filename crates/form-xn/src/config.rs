// File: src/config.rs
// Purpose: Configuration parsing from form-xn.toml

use crate::validation::ErrorDisplay;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "form-xn.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub forms: FormsConfig,

    #[serde(default)]
    pub dev: DevConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the compiled browser bindings, served under `/pkg`
    #[serde(default = "default_pkg_dir")]
    pub pkg_dir: String,
}

/// Dispatcher behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormsConfig {
    /// Messages per field in validation error responses ("first" or "all")
    #[serde(default)]
    pub error_display: ErrorDisplay,

    /// Largest accepted form body, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

/// Development configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    #[serde(default = "default_false")]
    pub live_reload: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pkg_dir() -> String {
    "crates/form-xn-wasm/pkg".to_string()
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

fn default_false() -> bool {
    false
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            pkg_dir: default_pkg_dir(),
        }
    }
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            error_display: ErrorDisplay::default(),
            body_limit: default_body_limit(),
        }
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            live_reload: default_false(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./form-xn.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.forms.error_display, ErrorDisplay::First);
        assert_eq!(config.forms.body_limit, 2 * 1024 * 1024);
        assert!(!config.dev.live_reload);
        assert_eq!(config.server.pkg_dir, "crates/form-xn-wasm/pkg");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.forms.error_display, ErrorDisplay::First);
    }

    #[test]
    fn test_custom_forms_section() {
        let toml = r#"
            [server]
            port = 8080

            [forms]
            error_display = "all"
            body_limit = 1024
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.forms.error_display, ErrorDisplay::All);
        assert_eq!(config.forms.body_limit, 1024);
    }

    #[test]
    fn test_rejects_unknown_display_mode() {
        let toml = r#"
            [forms]
            error_display = "everything"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("definitely/not/here/form-xn.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!("form-xn-bad-{}.toml", std::process::id()));
        fs::write(&path, "[server\nport = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        fs::remove_file(&path).unwrap();
    }
}
