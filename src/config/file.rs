//! Configuration file support for persistent settings.
//!
//! This module loads configuration from a TOML file located at
//! `~/.config/tsactl/config.toml` (or the platform-specific equivalent).
//! Configuration file values serve as defaults that can be overridden by
//! environment variables and CLI arguments.
//!
//! # Layering
//!
//! The precedence order is: **CLI argument > environment > config file >
//! hardcoded default**.
//!
//! # Example config
//!
//! ```toml
//! device = "/dev/ttyACM0"
//! baudrate = 115200
//! timeout_ms = 2000
//! debug = false
//! json = false
//!
//! [save]
//! capture = "~/captures/SA_<date>_<time>.png"
//! trace = "~/captures/SA_<date>_<time>_<trace>.csv"
//! traces = "~/captures/SA_<date>_<time>.csv"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration file structure.
///
/// All fields are `Option<T>` so we can detect which values are present in the
/// config file and apply layered configuration.
#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    /// Serial port of the instrument (auto-detected when absent)
    pub device: Option<String>,

    /// Serial baud rate
    pub baudrate: Option<u32>,

    /// Reply timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Whether to log serial traffic
    pub debug: Option<bool>,

    /// Whether to print read results as JSON
    pub json: Option<bool>,

    /// Export options
    #[serde(default)]
    pub save: FileSaveConfig,
}

/// Export options from the configuration file.
#[derive(Deserialize, Default, Debug)]
pub struct FileSaveConfig {
    /// File name template for a screen capture (`<date>`, `<time>`)
    pub capture: Option<String>,

    /// File name template for a single trace (`<date>`, `<time>`, `<trace>`)
    pub trace: Option<String>,

    /// File name template for several traces (`<date>`, `<time>`)
    pub traces: Option<String>,
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

impl FileConfig {
    /// Returns the path where the configuration file is expected.
    ///
    /// The configuration file is located at `<config_dir>/tsactl/config.toml`,
    /// where `<config_dir>` is the platform-specific configuration directory
    /// (e.g., `~/.config` on Linux, `%APPDATA%` on Windows).
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tsactl").join("config.toml"))
    }

    /// Load configuration from the default config file location.
    ///
    /// If the config file doesn't exist, returns a default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file exists but cannot be read
    /// - The config file exists but contains invalid TOML or mistyped values
    pub fn load() -> anyhow::Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file at {}: {e}", path.display())
        })?;

        toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file at {}: {e}", path.display())
        })
    }
}
