//! Config - pool の設定
//!
//! 読み込み順: デフォルト値 → JSON ファイル（任意）→ 環境変数。
//! CLI フラグによる上書きは bin 側で行う。

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const ENV_WORKER_COUNT: &str = "BOBBIN_WORKER_COUNT";
pub const ENV_QUEUE_CAPACITY: &str = "BOBBIN_QUEUE_CAPACITY";
pub const ENV_SHUTDOWN_TIMEOUT_SECS: &str = "BOBBIN_SHUTDOWN_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "BOBBIN_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),

    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    #[serde(rename = "shutdown_timeout_secs", with = "secs")]
    pub shutdown_timeout: Duration,
    pub log_level: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            queue_capacity: 100,
            shutdown_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl PoolConfig {
    /// Defaults overridden by `BOBBIN_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply overrides from a variable lookup. Empty values are treated as unset.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_WORKER_COUNT) {
            self.worker_count = parse_number(ENV_WORKER_COUNT, &v)?;
        }
        if let Some(v) = get(ENV_QUEUE_CAPACITY) {
            self.queue_capacity = parse_number(ENV_QUEUE_CAPACITY, &v)?;
        }
        if let Some(v) = get(ENV_SHUTDOWN_TIMEOUT_SECS) {
            self.shutdown_timeout = Duration::from_secs(parse_number(ENV_SHUTDOWN_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = get(ENV_LOG_LEVEL) {
            self.log_level = v.trim().to_lowercase();
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Zero("worker_count"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Zero("queue_capacity"));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::UnknownLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.worker_count, 3);
        assert_eq!(cfg.queue_capacity, 100);
        cfg.validate().unwrap();
    }

    #[test]
    fn env_overrides_defaults() {
        let cfg = PoolConfig::default()
            .with_env(env(&[
                (ENV_WORKER_COUNT, "8"),
                (ENV_QUEUE_CAPACITY, " 16 "),
                (ENV_SHUTDOWN_TIMEOUT_SECS, "5"),
                (ENV_LOG_LEVEL, "DEBUG"),
            ]))
            .unwrap();
        assert_eq!(cfg.worker_count, 8);
        assert_eq!(cfg.queue_capacity, 16);
        assert_eq!(cfg.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let cfg = PoolConfig::default()
            .with_env(env(&[(ENV_WORKER_COUNT, "")]))
            .unwrap();
        assert_eq!(cfg.worker_count, 3);
    }

    #[rstest]
    #[case::negative("-1")]
    #[case::word("three")]
    #[case::float("2.5")]
    fn unparsable_worker_count_is_rejected(#[case] raw: &str) {
        let err = PoolConfig::default()
            .with_env(env(&[(ENV_WORKER_COUNT, raw)]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_WORKER_COUNT));
    }

    #[rstest]
    #[case::no_workers(PoolConfig { worker_count: 0, ..PoolConfig::default() })]
    #[case::no_capacity(PoolConfig { queue_capacity: 0, ..PoolConfig::default() })]
    #[case::bad_level(PoolConfig { log_level: "loud".into(), ..PoolConfig::default() })]
    fn validate_rejects(#[case] cfg: PoolConfig) {
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"worker_count": 2, "shutdown_timeout_secs": 1}}"#).unwrap();

        let cfg = PoolConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.worker_count, 2);
        assert_eq!(cfg.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(cfg.queue_capacity, 100);
    }
}
