use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::target::SnippetLanguage;
use crate::{Error, Result};

pub const DEFAULT_MAX_LINE_LENGTH: usize = 60;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_TICK_RATE_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Soft-wrap threshold for typed lines.
    pub max_line_length: usize,
    pub show_errors: bool,
    /// Time budget; `None` runs until the snippet is typed.
    pub number_of_secs: Option<u64>,
    pub sample_interval_ms: u64,
    pub tick_rate_ms: u64,
    pub caret_blink_ms: u64,
    /// Restrict bundled snippets to one language.
    pub language: Option<SnippetLanguage>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            show_errors: true,
            number_of_secs: None,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            caret_blink_ms: 500,
            language: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let zero_field = if self.max_line_length == 0 {
            Some("max_line_length")
        } else if self.sample_interval_ms == 0 {
            Some("sample_interval_ms")
        } else if self.tick_rate_ms == 0 {
            Some("tick_rate_ms")
        } else if self.number_of_secs == Some(0) {
            Some("number_of_secs")
        } else {
            None
        };

        match zero_field {
            Some(field) => Err(Error::InvalidConfig {
                message: format!("{} must be at least 1", field),
            }),
            None => Ok(()),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            // a first run has no config yet
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "falling back to default config");
                    Config::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            max_line_length: 80,
            show_errors: false,
            number_of_secs: Some(60),
            sample_interval_ms: 500,
            tick_rate_ms: 50,
            caret_blink_ms: 300,
            language: Some(SnippetLanguage::Rust),
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_line_length": 42 }"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.max_line_length, 42);
        assert!(loaded.show_errors);
        assert_eq!(loaded.sample_interval_ms, DEFAULT_SAMPLE_INTERVAL_MS);
    }

    #[test]
    fn garbage_and_invalid_files_fall_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, "not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());

        fs::write(&path, r#"{ "max_line_length": 0 }"#).unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn validate_rejects_zero_values() {
        assert!(Config::default().validate().is_ok());

        let cfg = Config {
            max_line_length: 0,
            ..Config::default()
        };
        assert_matches!(cfg.validate(), Err(Error::InvalidConfig { message }) if message.contains("max_line_length"));

        let cfg = Config {
            tick_rate_ms: 0,
            ..Config::default()
        };
        assert_matches!(cfg.validate(), Err(Error::InvalidConfig { .. }));
    }
}
