use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// How this presentation instance starts. Remote config is never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub result_duration_secs: u32,
    pub global_time_secs: u32,
    pub wheel_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 500,
            result_duration_secs: 60,
            global_time_secs: 0,
            wheel_dir: None,
            log_level: "info".to_string(),
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
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

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("settings.json"));
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(settings, store.load());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("nested/deeper/settings.json"));
        let settings = Settings {
            server_url: "http://stadium.local:8080".into(),
            poll_interval_ms: 250,
            result_duration_secs: 45,
            global_time_secs: 2700,
            wheel_dir: Some(PathBuf::from("/srv/wheel_images")),
            log_level: "debug".into(),
        };
        store.save(&settings).unwrap();
        assert_eq!(settings, store.load());
    }

    #[test]
    fn missing_or_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettingsStore::with_path(&path);
        assert_eq!(store.load(), Settings::default());

        fs::write(&path, b"{ nope").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, br#"{"poll_interval_ms": 1000}"#).unwrap();

        let loaded = FileSettingsStore::with_path(&path).load();
        assert_eq!(loaded.poll_interval_ms, 1000);
        assert_eq!(loaded.result_duration_secs, 60);
    }
}
