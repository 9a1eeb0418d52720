//! Configuration for the crosscheck pipeline.
//!
//! [`CrosscheckConfig`] bundles the web-search settings with the scoring
//! knobs and round-trips through TOML. Missing keys take their defaults.

use std::path::{Path, PathBuf};

use crosscheck_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CrosscheckError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosscheckConfig {
    /// Engine chain, timeouts and scraping limits.
    pub search: SearchConfig,
    /// Weights and thresholds for answer validation.
    pub scoring: ScoringConfig,
}

/// Scoring and validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Base confidence assumed for a generated answer with no prior.
    pub default_confidence: f64,
    /// Answer length, in characters, that counts as complete.
    pub completeness_chars: usize,
    /// Number of top web results quoted in the digest.
    pub digest_sources: usize,
    /// Scores below this mark a source as low confidence.
    pub low_confidence_threshold: f64,
    /// Web results gathered per question.
    pub num_results: usize,
    /// Upper bound on the whole search-and-enrich step, in seconds.
    pub request_deadline_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_confidence: 0.6,
            completeness_chars: 500,
            digest_sources: 3,
            low_confidence_threshold: 0.4,
            num_results: 5,
            request_deadline_secs: 90,
        }
    }
}

impl ScoringConfig {
    /// Validate the scoring settings.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("default_confidence", self.default_confidence),
            ("low_confidence_threshold", self.low_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CrosscheckError::Config(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("completeness_chars", self.completeness_chars),
            ("digest_sources", self.digest_sources),
            ("num_results", self.num_results),
        ] {
            if value == 0 {
                return Err(CrosscheckError::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.request_deadline_secs == 0 {
            return Err(CrosscheckError::Config(
                "request_deadline_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl CrosscheckConfig {
    /// Validate both sections.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::Search`] for search settings and
    /// [`CrosscheckError::Config`] for scoring settings.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.scoring.validate()
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CrosscheckError::Config(e.to_string()))
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
            toml::to_string_pretty(self).map_err(|e| CrosscheckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/crosscheck/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("crosscheck").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("crosscheck")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/crosscheck-config/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crosscheck_search::SearchEngine;

    #[test]
    fn default_config_is_valid() {
        assert!(CrosscheckConfig::default().validate().is_ok());
    }

    #[test]
    fn scoring_defaults() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.default_confidence, 0.6);
        assert_eq!(scoring.completeness_chars, 500);
        assert_eq!(scoring.digest_sources, 3);
        assert_eq!(scoring.low_confidence_threshold, 0.4);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let mut config = CrosscheckConfig::default();
        config.scoring.low_confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("low_confidence_threshold"));
    }

    #[test]
    fn zero_deadline_rejected() {
        let mut config = CrosscheckConfig::default();
        config.scoring.request_deadline_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_search_section_surfaces_as_search_error() {
        let mut config = CrosscheckConfig::default();
        config.search.engines.clear();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CrosscheckError::Search(_)));
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CrosscheckConfig::default();
        config.search.engines = vec![SearchEngine::SearX, SearchEngine::Bing];
        config.search.max_results = 8;
        config.scoring.digest_sources = 2;
        config.save_to_file(&path).unwrap();

        let loaded = CrosscheckConfig::from_file(&path).unwrap();
        assert_eq!(loaded.search.engines, config.search.engines);
        assert_eq!(loaded.search.max_results, 8);
        assert_eq!(loaded.scoring.digest_sources, 2);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nnum_results = 3\n").unwrap();

        let loaded = CrosscheckConfig::from_file(&path).unwrap();
        assert_eq!(loaded.scoring.num_results, 3);
        assert_eq!(loaded.scoring.default_confidence, 0.6);
        assert_eq!(loaded.search.max_content_chars, 5000);
    }

    #[test]
    fn from_file_nonexistent_returns_io_error() {
        let result = CrosscheckConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(CrosscheckError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(matches!(
            CrosscheckConfig::from_file(&path),
            Err(CrosscheckError::Config(_))
        ));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = CrosscheckConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("crosscheck"));
    }
}
