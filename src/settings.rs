use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::error::{CadenceError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,
    #[serde(default = "default_run_horizon_months")]
    pub run_horizon_months: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_horizon_months() -> u32 {
    EngineConfig::default().horizon_months
}

fn default_run_horizon_months() -> u32 {
    EngineConfig::default().run_horizon_months
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            horizon_months: default_horizon_months(),
            run_horizon_months: default_run_horizon_months(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            horizon_months: self.horizon_months,
            run_horizon_months: self.run_horizon_months,
        }
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_path().join("cadence.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cadence")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("cadence")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CadenceError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.horizon_months, 12);
        assert_eq!(s.run_horizon_months, 0);
        assert_eq!(s.log_level, "info");
        assert!(s.data_dir.ends_with("cadence"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/cadence-test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.horizon_months, 12);
        assert_eq!(s.run_horizon_months, 0);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.db_path(), PathBuf::from("/tmp/cadence-test/cadence.db"));
    }

    #[test]
    fn test_engine_config_follows_settings() {
        let s = Settings {
            horizon_months: 3,
            run_horizon_months: 1,
            ..Settings::default()
        };
        assert_eq!(
            s.engine_config(),
            EngineConfig {
                horizon_months: 3,
                run_horizon_months: 1,
            }
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            horizon_months: 6,
            run_horizon_months: 0,
            log_level: "debug".to_string(),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.horizon_months, 6);
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_shellexpand_tilde() {
        if let Some(home) = dirs::home_dir() {
            let expanded = shellexpand_path("~/books");
            assert_eq!(expanded, format!("{}/books", home.to_string_lossy()));
        }
    }
}
