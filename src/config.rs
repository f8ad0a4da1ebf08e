use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::Settings;

/// Persisted setup defaults. Round results are deliberately not stored;
/// only the slider positions and the sound toggle survive a restart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub digits: usize,
    pub display_secs: f64,
    pub rounds: usize,
    pub recall_delay_secs: f64,
    pub sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            digits: settings.digits,
            display_secs: settings.display_secs,
            rounds: settings.rounds,
            recall_delay_secs: settings.recall_delay_secs,
            sound: true,
        }
    }
}

impl Config {
    pub fn to_settings(&self) -> Settings {
        Settings {
            digits: self.digits,
            display_secs: self.display_secs,
            rounds: self.rounds,
            recall_delay_secs: self.recall_delay_secs,
        }
    }

    pub fn from_settings(settings: &Settings, sound: bool) -> Self {
        Self {
            digits: settings.digits,
            display_secs: settings.display_secs,
            rounds: settings.rounds,
            recall_delay_secs: settings.recall_delay_secs,
            sound,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "recall") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("recall_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            digits: 12,
            display_secs: 1.5,
            rounds: 25,
            recall_delay_secs: 2.0,
            sound: false,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn settings_roundtrip() {
        let cfg = Config::default();
        let settings = cfg.to_settings();
        assert_eq!(Config::from_settings(&settings, true), cfg);
    }
}
