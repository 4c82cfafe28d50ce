//! Application configuration, persisted as TOML.
//!
//! ```toml
//! [search]
//! disabled_engines = ["bing"]
//! max_results = 20
//! retry = 3
//! timeout_seconds = 8
//!
//! [search.rerank]
//! keep_k_per_hostname = 2
//!
//! [documents]
//! fetch_top = 5
//! concurrency = 4
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::{Path, PathBuf};

use scrubber_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrubberError};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "SCRUBBER_CONFIG_DIR";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubberConfig {
    /// Engines, retry policy, caching and ranking.
    pub search: SearchConfig,
    /// Document capture after ranking.
    pub documents: DocumentConfig,
}

/// How many ranked results are fetched in full, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Number of top-ranked results to capture. 0 skips capture.
    pub fetch_top: usize,
    /// Captures in flight at once.
    pub concurrency: usize,
    /// Character limit for each document's text.
    pub max_chars: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            fetch_top: 5,
            concurrency: 4,
            max_chars: scrubber_search::content::DEFAULT_MAX_CHARS,
        }
    }
}

impl ScrubberConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScrubberError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScrubberError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the search section and the document settings.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.documents.fetch_top > 0 && self.documents.concurrency == 0 {
            return Err(ScrubberError::Config(
                "documents.concurrency must be greater than 0".into(),
            ));
        }
        if self.documents.max_chars == 0 {
            return Err(ScrubberError::Config(
                "documents.max_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The default config file path: `<config dir>/scrubber/config.toml`.
    ///
    /// [`CONFIG_DIR_ENV`] replaces `<config dir>/scrubber` when set.
    pub fn default_config_path() -> PathBuf {
        config_dir().join("config.toml")
    }
}

fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("scrubber"))
        .unwrap_or_else(|| std::env::temp_dir().join("scrubber-config"))
}
