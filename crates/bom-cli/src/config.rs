//! Configuration file management for bom.
//!
//! Provides a TOML-based config file at `~/.config/bommaster/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bom_core::config::{GeminiConfig, api_key_from_env};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the bom config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/bommaster` or
/// `~/.config/bommaster`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("bommaster");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bommaster")
}

/// Return the path to the bom config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Show only the first and last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct BomConfig {
    pub gemini: GeminiConfig,
}

impl BomConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `cli_api_key` > `BOM_API_KEY` > `GEMINI_API_KEY` > `API_KEY` > `gemini.api_key`
    /// - Model: `BOM_GEMINI_MODEL` > `gemini.model` > `GeminiConfig::DEFAULT_MODEL`
    /// - Base URL: `BOM_GEMINI_BASE_URL` > `gemini.base_url` > `GeminiConfig::DEFAULT_BASE_URL`
    ///
    /// A missing key is not an error here; only the suggestion fetch needs it.
    pub fn resolve(cli_api_key: Option<&str>) -> Self {
        let file = load_config().ok().map(|c| c.gemini).unwrap_or_default();

        let api_key = cli_api_key
            .map(str::to_string)
            .filter(|k| !k.trim().is_empty())
            .or_else(api_key_from_env)
            .or(file.api_key);

        let mut gemini = GeminiConfig::new(api_key);

        if let Ok(model) = std::env::var("BOM_GEMINI_MODEL") {
            gemini = gemini.with_model(model);
        } else if let Some(model) = file.model {
            gemini = gemini.with_model(model);
        }

        if let Ok(url) = std::env::var("BOM_GEMINI_BASE_URL") {
            gemini = gemini.with_base_url(url);
        } else if let Some(url) = file.base_url {
            gemini = gemini.with_base_url(url);
        }

        debug!(?gemini, "resolved configuration");
        Self { gemini }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
