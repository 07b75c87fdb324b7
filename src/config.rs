use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::replay::{
    ReplaySettings, ReplayStrategy, DEFAULT_PAUSE_THRESHOLD_MS, DEFAULT_TICK_MS,
};
use crate::survey::SurveyMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: SurveyMode,
    pub replay_strategy: ReplayStrategy,
    pub tick_ms: u64,
    pub pause_threshold_ms: u64,
    pub dedupe_samples: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: SurveyMode::Single,
            replay_strategy: ReplayStrategy::FixedTick,
            tick_ms: DEFAULT_TICK_MS,
            pause_threshold_ms: DEFAULT_PAUSE_THRESHOLD_MS,
            dedupe_samples: false,
        }
    }
}

impl Config {
    pub fn replay_settings(&self) -> ReplaySettings {
        ReplaySettings {
            strategy: self.replay_strategy,
            tick_ms: self.tick_ms.max(1),
            pause_threshold_ms: self.pause_threshold_ms,
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "hovertrace") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("hovertrace_config.json")
        };
        Self { path }
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
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
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
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            mode: SurveyMode::Multi,
            replay_strategy: ReplayStrategy::TimeAccurate,
            tick_ms: 25,
            pause_threshold_ms: 500,
            dedupe_samples: true,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"{{{").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{"mode": "multi", "replay_strategy": "time-accurate"}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, SurveyMode::Multi);
        assert_eq!(cfg.replay_strategy, ReplayStrategy::TimeAccurate);
        assert_eq!(cfg.tick_ms, DEFAULT_TICK_MS);
        assert!(!cfg.dedupe_samples);
    }

    #[test]
    fn zero_tick_is_raised_to_one() {
        let cfg = Config {
            tick_ms: 0,
            ..Config::default()
        };
        assert_eq!(cfg.replay_settings().tick_ms, 1);
    }
}
