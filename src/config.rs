use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{JobScoutError, Result};

/// Global jobscout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Detections at or above this confidence get the "high confidence" badge
    #[serde(default = "default_threshold")]
    pub high_confidence_threshold: f64,

    /// Hosts the generic matcher should never treat as job pages
    #[serde(default)]
    pub extra_excluded_hosts: Vec<String>,
}

fn default_threshold() -> f64 {
    0.7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            high_confidence_threshold: default_threshold(),
            extra_excluded_hosts: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML config
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.high_confidence_threshold) {
            return Err(JobScoutError::ConfigError(format!(
                "high_confidence_threshold must be between 0 and 1, got {}",
                self.high_confidence_threshold
            )));
        }
        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| JobScoutError::ConfigError(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config directory (~/.config/jobscout on Linux)
    pub fn config_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "jobscout")
            .ok_or_else(|| JobScoutError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    ///
    /// Supports JOBSCOUT_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("JOBSCOUT_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.high_confidence_threshold, 0.7);
        assert!(config.extra_excluded_hosts.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(r#"extra_excluded_hosts = ["linkedin.com"]"#).unwrap();
        assert_eq!(config.high_confidence_threshold, 0.7);
        assert_eq!(config.extra_excluded_hosts, vec!["linkedin.com"]);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = Config::parse("high_confidence_threshold = 1.5").unwrap_err();
        assert!(matches!(err, JobScoutError::ConfigError(_)));
    }
}
