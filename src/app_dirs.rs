use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "codetype")
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("codetype_config.json"))
    }

    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("codetype")
                .join("codetype.log")
        } else {
            ProjectDirs::from("", "", "codetype")
                .map(|pd| pd.data_local_dir().join("codetype.log"))
                .unwrap_or_else(|| PathBuf::from("codetype.log"))
        }
    }
}
