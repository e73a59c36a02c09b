use crate::core::validator::ShiftLimits;
use crate::db::pool::DEFAULT_BUSY_TIMEOUT_MS;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "rattendance";
const CONFIG_FILE: &str = "rattendance.conf";
const DATABASE_FILE: &str = "rattendance.sqlite";

/// Keys every complete configuration file carries.
pub const KNOWN_KEYS: &[&str] = &[
    "database",
    "operator",
    "min_shift_minutes",
    "max_shift_hours",
    "log_level",
    "busy_timeout_ms",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Actor used when `--actor` is not given.
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default = "default_min_shift")]
    pub min_shift_minutes: i64,
    #[serde(default = "default_max_shift")]
    pub max_shift_hours: i64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How long a write waits for another writer's transaction.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_min_shift() -> i64 {
    15
}
fn default_max_shift() -> i64 {
    24
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_busy_timeout() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            operator: None,
            min_shift_minutes: default_min_shift(),
            max_shift_hours: default_max_shift(),
            log_level: default_log_level(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }

    /// Platform configuration directory, `.` when the platform has none.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DATABASE_FILE)
    }

    /// Load the configuration file, or defaults when it does not exist.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn shift_limits(&self) -> ShiftLimits {
        ShiftLimits {
            min_minutes: self.min_shift_minutes,
            max_minutes: self.max_shift_hours * 60,
        }
    }

    /// Keys from `KNOWN_KEYS` absent from the file at `path`.
    pub fn missing_keys(path: &Path) -> AppResult<Vec<&'static str>> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let yaml: Value = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {}", path.display(), e)))?;

        let map = yaml
            .as_mapping()
            .ok_or_else(|| AppError::Config(format!("{} is not a YAML mapping", path.display())))?;

        Ok(KNOWN_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(*k))
            .collect())
    }

    /// Create the config directory and, outside test mode, write a fresh
    /// configuration file. Returns the configuration in effect.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                // test runs keep relative paths relative to the working dir
                if p.is_absolute() || is_test {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => dir.join(DATABASE_FILE),
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let config = Self::with_database(db_path.to_string_lossy().to_string());

        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Config(e.to_string()))?;
            fs::write(Self::config_file(), yaml)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, body: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("rattendance_cfg_{}_{}", std::process::id(), name));
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let p = temp_file("partial.conf", "database: /tmp/x.sqlite\n");
        let cfg = Config::load_from(&p).unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.min_shift_minutes, 15);
        assert_eq!(cfg.shift_limits(), ShiftLimits::default());
        assert_eq!(cfg.busy_timeout_ms, 5_000);

        let missing = Config::missing_keys(&p).unwrap();
        assert!(missing.contains(&"operator"));
        assert!(!missing.contains(&"database"));
        fs::remove_file(p).ok();
    }

    #[test]
    fn broken_yaml_is_a_config_error() {
        let p = temp_file("broken.conf", "database: [unterminated\n");
        let err = Config::load_from(&p).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        fs::remove_file(p).ok();
    }
}
