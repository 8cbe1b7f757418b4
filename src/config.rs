//! Configuration loader and validator for the listing store.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Page sizes and timing of the listing store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub home_page_size: usize,
    pub search_page_size: usize,
    pub search_debounce_ms: u64,
    pub map_limit: usize,
}

impl StoreConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            home_page_size: 10,
            search_page_size: 20,
            search_debounce_ms: 200,
            map_limit: 50,
        }
    }
}

/// Simulated backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MockConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// JSON array of raw listing records; the bundled samples when unset.
    pub dataset: Option<PathBuf>,
}

impl MockConfig {
    pub fn delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 800,
            max_delay_ms: 3400,
            dataset: None,
        }
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `roome.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("roome.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.store.home_page_size == 0 {
        return Err(ConfigError::Invalid("store.home_page_size must be > 0"));
    }
    if cfg.store.search_page_size == 0 {
        return Err(ConfigError::Invalid("store.search_page_size must be > 0"));
    }
    if cfg.store.map_limit == 0 {
        return Err(ConfigError::Invalid("store.map_limit must be > 0"));
    }
    if cfg.mock.min_delay_ms > cfg.mock.max_delay_ms {
        return Err(ConfigError::Invalid("mock.min_delay_ms must be <= mock.max_delay_ms"));
    }
    Ok(())
}

/// Example configuration, equal to the defaults.
pub fn example() -> &'static str {
    r#"store:
  home_page_size: 10
  search_page_size: 20
  search_debounce_ms: 200
  map_limit: 50

mock:
  min_delay_ms: 800
  max_delay_ms: 3400
  dataset: null
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn example_is_the_default() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.store.search_debounce(), Duration::from_millis(200));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: Config = serde_yaml::from_str("store:\n  home_page_size: 4\n").unwrap();
        assert_eq!(cfg.store.home_page_size, 4);
        assert_eq!(cfg.store.map_limit, 50);
        assert_eq!(cfg.mock, MockConfig::default());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut cfg = Config::default();
        cfg.store.search_page_size = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        let mut cfg = Config::default();
        cfg.mock.min_delay_ms = 5000;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "mock:\n  min_delay_ms: 0\n  max_delay_ms: 0\n  dataset: listings.json").unwrap();
        let cfg = load(Some(file.path())).unwrap();
        assert_eq!(cfg.mock.delay_range(), (Duration::ZERO, Duration::ZERO));
        assert_eq!(cfg.mock.dataset, Some(PathBuf::from("listings.json")));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
