//! Configuration loaded from `hyoki.toml`.
//!
//! ```toml
//! default_presets = ["下さ", "出来"]
//!
//! [[corrections]]
//! wrong = "当クリニック"
//! correct = "当院"
//! ```

use crate::domain::{presets, Correction};
use crate::error::{HyokiError, HyokiResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "hyoki.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Presets used when none are selected explicitly
    #[serde(default)]
    pub default_presets: Vec<String>,

    /// Site-specific pairs applied after the presets
    #[serde(default)]
    pub corrections: Vec<CorrectionEntry>,
}

/// One configured find/replace pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub wrong: String,
    pub correct: String,
}

impl Config {
    /// Parses configuration text.
    pub fn parse(content: &str, path: &Path) -> HyokiResult<Self> {
        let config: Config = toml::from_str(content).map_err(|e| HyokiError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> HyokiResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HyokiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Loads `hyoki.toml` from the working directory if present.
    pub fn load_from_default() -> HyokiResult<Self> {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self, path: &Path) -> HyokiResult<()> {
        if let Some(unknown) = self
            .default_presets
            .iter()
            .find(|key| presets::find(key).is_none())
        {
            return Err(HyokiError::Config {
                path: path.to_path_buf(),
                reason: format!("unknown preset '{}'", unknown),
            });
        }
        if self.corrections.iter().any(|c| c.wrong.is_empty()) {
            return Err(HyokiError::Config {
                path: path.to_path_buf(),
                reason: "correction with empty 'wrong' value".to_string(),
            });
        }
        Ok(())
    }

    /// Configured pairs as corrections.
    pub fn extra_corrections(&self) -> Vec<Correction> {
        self.corrections
            .iter()
            .map(|c| Correction {
                wrong: c.wrong.clone(),
                correct: c.correct.clone(),
            })
            .collect()
    }
}
