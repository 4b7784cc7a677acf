//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [search]
//! tt_size_mb = 64
//! max_depth = 12
//!
//! [eval.piece_values]
//! queen = 950
//!
//! [eval.terms.mobility]
//! weights = [4, 4, 2, 1]
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::eval::EvalConfig;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Transposition table size in megabytes.
    #[serde(default = "default_tt_size_mb")]
    pub tt_size_mb: usize,
    /// When false the table is neither probed nor written.
    #[serde(default = "default_true")]
    pub use_tt: bool,
    /// Upper bound on iterative deepening.
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
    /// Resolve captures past the horizon instead of evaluating directly.
    #[serde(default = "default_true")]
    pub quiescence: bool,
    /// Nodes searched between deadline and stop-flag checks.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
}

fn default_tt_size_mb() -> usize {
    16
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u8 {
    64
}

fn default_check_interval() -> u64 {
    4096
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            tt_size_mb: default_tt_size_mb(),
            use_tt: true,
            max_depth: default_max_depth(),
            quiescence: true,
            check_interval: default_check_interval(),
        }
    }
}

/// Top-level configuration, one section per subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub eval: EvalConfig,
}

impl EngineConfig {
    /// Loads `path`, or returns the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be
    /// read, [`ConfigError::ParseError`] on malformed TOML, and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `engine.toml` in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("engine.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        if search.tt_size_mb == 0 {
            return Err(ConfigError::Invalid("tt_size_mb must be at least 1".into()));
        }
        if search.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if search.check_interval == 0 {
            return Err(ConfigError::Invalid(
                "check_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search.tt_size_mb, 16);
        assert_eq!(config.search.check_interval, 4096);
        assert!(config.search.quiescence);
    }

    #[test]
    fn partial_sections() {
        let config = EngineConfig::from_toml(
            r#"
[search]
max_depth = 8
quiescence = false

[eval.piece_values]
knight = 300

[eval.terms.king_safety]
shield_near = 20
"#,
        )
        .unwrap();
        assert_eq!(config.search.max_depth, 8);
        assert!(!config.search.quiescence);
        assert!(config.search.use_tt);
        assert_eq!(config.eval.piece_values.knight, 300);
        assert_eq!(config.eval.piece_values.bishop, 330);
        assert_eq!(config.eval.terms.king_safety.shield_near, 20);
        assert_eq!(config.eval.terms.king_safety.shield_far, 6);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = EngineConfig::from_toml("[search]\ntt_size_mb = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_toml("[search]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = EngineConfig::from_toml("[search\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = EngineConfig::load(Path::new("does/not/exist/engine.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
