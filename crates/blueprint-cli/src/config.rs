//! Configuration file management for blueprint.
//!
//! Provides a TOML-based config file at `~/.config/blueprint/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use blueprint_gemini::GeminiConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub gemini: GeminiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiSection {
    pub api_key: String,
    #[serde(default)]
    pub model: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the blueprint config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/blueprint` or
/// `~/.config/blueprint`. We intentionally ignore the platform-specific
/// `dirs::config_dir()` (which returns `~/Library/Application Support` on
/// macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("blueprint");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("blueprint")
}

/// Return the path to the blueprint config file.
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
/// Sets file permissions to 0600 on Unix (the file holds an API key).
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Resolve the Gemini configuration using the chain:
/// CLI flag > env var > config file > default.
///
/// - API key: `cli_api_key` > `BLUEPRINT_API_KEY` env > `GEMINI_API_KEY` env
///   > `config_file.gemini.api_key` > error
/// - Model: `cli_model` > `BLUEPRINT_MODEL` env > `config_file.gemini.model`
///   > built-in default
pub fn resolve(cli_api_key: Option<&str>, cli_model: Option<&str>) -> Result<GeminiConfig> {
    let file_config = load_config().ok();

    let api_key = if let Some(key) = cli_api_key {
        key.to_string()
    } else if let Ok(key) = std::env::var("BLUEPRINT_API_KEY") {
        key
    } else if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        key
    } else if let Some(ref cfg) = file_config {
        cfg.gemini.api_key.clone()
    } else {
        bail!(
            "Gemini API key not found; set BLUEPRINT_API_KEY or run `blueprint init` to create a config file"
        );
    };
    if api_key.trim().is_empty() {
        bail!("Gemini API key is empty");
    }

    let default_model = GeminiConfig::default().model;
    let model = if let Some(model) = cli_model {
        model.to_string()
    } else if let Ok(model) = std::env::var("BLUEPRINT_MODEL") {
        model
    } else if let Some(model) = file_config.as_ref().and_then(|c| c.gemini.model.clone()) {
        model
    } else {
        default_model
    };

    Ok(GeminiConfig {
        api_key,
        model,
        ..Default::default()
    })
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
