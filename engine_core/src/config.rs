use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed logic interval for `Pre/Normal/Post`.
    #[serde(default = "default_logic_interval_ms")]
    pub logic_interval_ms: f64,

    /// Render rate cap. `<= 0` renders every iteration.
    #[serde(default = "default_fps_cap")]
    pub fps_cap: f32,

    /// Logic dispatches allowed per iteration when late. 1 drops missed ticks.
    #[serde(default = "default_max_logic_steps")]
    pub max_logic_steps: u32,

    #[serde(default = "default_true")]
    pub log_rates: bool,

    #[serde(default = "default_rate_log_period_sec")]
    pub rate_log_period_sec: f32,

    #[serde(default)]
    pub install_ctrlc: bool,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_logic_interval_ms() -> f64 {
    15.0
}
fn default_fps_cap() -> f32 {
    60.0
}
fn default_max_logic_steps() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_rate_log_period_sec() -> f32 {
    1.0
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logic_interval_ms: default_logic_interval_ms(),
            fps_cap: default_fps_cap(),
            max_logic_steps: default_max_logic_steps(),
            log_rates: default_true(),
            rate_log_period_sec: default_rate_log_period_sec(),
            install_ctrlc: false,
            log_filter: default_log_filter(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s)
                .map_err(|e| EngineError::Config(format!("parse {}: {}", path.display(), e))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(EngineError::Config(format!("read {}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = EngineConfig::from_toml_str("fps_cap = 30.0\nmax_logic_steps = 4\n").unwrap();
        assert_eq!(cfg.fps_cap, 30.0);
        assert_eq!(cfg.max_logic_steps, 4);
        assert_eq!(cfg.logic_interval_ms, 15.0);
        assert!(cfg.log_rates);
        assert!(!cfg.install_ctrlc);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("fps_cap = \"fast\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = EngineConfig::load_or_default("does/not/exist/engine.toml").unwrap();
        assert_eq!(cfg.fps_cap, 60.0);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn unreadable_path_is_a_config_error() {
        let dir = std::env::temp_dir();
        let err = EngineConfig::load_or_default(&dir).unwrap_err();
        assert!(matches!(err, EngineError::Config(ref msg) if msg.starts_with("read ")));
    }
}
