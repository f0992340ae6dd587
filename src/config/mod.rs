//! Configuration loading and management.

use std::collections::HashMap;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::score::WeightTable;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exclude patterns (glob), applied to the Ruby source walk.
    #[serde(rename = "exclude")]
    pub exclude_patterns: Vec<String>,
    /// Severity thresholds.
    pub score: ScoreConfig,
    /// Weight table and traversal configuration.
    pub weights: WeightsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            score: ScoreConfig::default(),
            weights: WeightsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config`
    /// flags. Env vars with `FLAY_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::core::Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("FLAY_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, looking for flay.toml or
    /// .flay/flay.toml.
    ///
    /// Missing files are silently skipped (defaults are used). Env vars with
    /// `FLAY_` prefix override file/default values.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("flay.toml")))
            .merge(Toml::file(dir.join(".flay/flay.toml")))
            .merge(Env::prefixed("FLAY_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the whole configuration before any traversal runs: a bad weight
    /// or threshold would silently corrupt every score.
    pub fn validate(&self) -> Result<()> {
        self.score.validate()?;
        self.weights.validate()?;
        Ok(())
    }
}

/// Severity thresholds applied to raw scores. Classification is the
/// caller's concern; the scoring math never reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Scores at or above this are dangerous.
    pub dangerous_threshold: f64,
    /// Scores at or above this (but below dangerous) are moderate.
    pub moderate_threshold: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            dangerous_threshold: 50.0,
            moderate_threshold: 25.0,
        }
    }
}

impl ScoreConfig {
    fn validate(&self) -> Result<()> {
        if self.moderate_threshold < 0.0 || self.dangerous_threshold < 0.0 {
            return Err(crate::core::Error::config(
                "thresholds must be non-negative",
            ));
        }
        if self.moderate_threshold > self.dangerous_threshold {
            return Err(crate::core::Error::config(format!(
                "moderate_threshold ({}) must not exceed dangerous_threshold ({})",
                self.moderate_threshold, self.dangerous_threshold
            )));
        }
        Ok(())
    }
}

/// Weight table and traversal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// Multiplier growth per nesting level for control-flow penalties.
    pub nesting_factor: f64,
    /// Maximum tree depth before a root is rejected as malformed.
    pub max_depth: usize,
    /// Per-kind base-weight overrides, keyed by node kind name.
    pub overrides: HashMap<String, f64>,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            nesting_factor: crate::score::Scorer::DEFAULT_NESTING_FACTOR,
            max_depth: crate::score::Scorer::DEFAULT_MAX_DEPTH,
            overrides: HashMap::new(),
        }
    }
}

impl WeightsConfig {
    fn validate(&self) -> Result<()> {
        if !self.nesting_factor.is_finite() || self.nesting_factor < 0.0 {
            return Err(crate::core::Error::config(format!(
                "nesting_factor must be finite and non-negative, got {}",
                self.nesting_factor
            )));
        }
        if self.max_depth == 0 {
            return Err(crate::core::Error::config("max_depth must be at least 1"));
        }
        // Full override validation lives in the weight table constructor.
        WeightTable::with_overrides(&self.overrides)?;
        Ok(())
    }

    /// Build the weight table these settings describe.
    pub fn build_table(&self) -> Result<WeightTable> {
        WeightTable::with_overrides(&self.overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.score.dangerous_threshold, 50.0);
        assert_eq!(config.score.moderate_threshold, 25.0);
        assert_eq!(config.weights.nesting_factor, 0.5);
        assert_eq!(config.weights.max_depth, 512);
        assert!(config.weights.overrides.is_empty());
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_from_file_missing_path_errors() {
        let err = Config::from_file("/nonexistent/flay.toml").expect_err("missing file");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_default_missing_files_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_default(dir.path()).expect("defaults");
        assert_eq!(config.score.moderate_threshold, 25.0);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flay.toml");
        let mut file = std::fs::File::create(&path).expect("create file");
        writeln!(
            file,
            "exclude = [\"vendor/**\"]\n\n\
             [score]\n\
             moderate_threshold = 10.0\n\n\
             [weights]\n\
             nesting_factor = 1.0\n\n\
             [weights.overrides]\n\
             literal = 0.0\n"
        )
        .expect("write config");

        let config = Config::from_file(&path).expect("valid config");
        assert_eq!(config.exclude_patterns, vec!["vendor/**"]);
        assert_eq!(config.score.moderate_threshold, 10.0);
        // Unset keys keep their defaults.
        assert_eq!(config.score.dangerous_threshold, 50.0);
        assert_eq!(config.weights.nesting_factor, 1.0);
        assert_eq!(config.weights.overrides.get("literal"), Some(&0.0));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = Config {
            score: ScoreConfig {
                dangerous_threshold: 10.0,
                moderate_threshold: 20.0,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_override_rejected_at_startup() {
        let mut config = Config::default();
        config
            .weights
            .overrides
            .insert("no_such_kind".to_string(), 1.0);
        let err = config.validate().expect_err("unknown kind");
        assert!(err.to_string().contains("unknown node kind"));
    }

    #[test]
    fn test_zero_max_depth_rejected() {
        let mut config = Config::default();
        config.weights.max_depth = 0;
        assert!(config.validate().is_err());
    }
}
