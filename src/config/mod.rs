use crate::errors::{AppError, AppResult};
use crate::notify::settings::{NotificationSetting, default_settings};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            window_secs: default_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub default_engineer: Option<String>,
    #[serde(default = "default_lunch_limit")]
    pub lunch_max_hours_after_start: f64,
    #[serde(default = "default_outbox")]
    pub notification_outbox: String,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default = "default_settings")]
    pub notifications: Vec<NotificationSetting>,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_lunch_limit() -> f64 {
    6.0
}
fn default_outbox() -> String {
    Config::config_dir()
        .join("outbox.jsonl")
        .to_string_lossy()
        .to_string()
}
fn default_max_calls() -> usize {
    10
}
fn default_window_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_engineer: None,
            lunch_max_hours_after_start: default_lunch_limit(),
            notification_outbox: default_outbox(),
            rate_limit: RateLimitConfig::default(),
            notifications: default_settings(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rworklog")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rworklog")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rworklog.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rworklog.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Engineer used as audit actor when `--user` is absent.
    pub fn resolve_actor(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.default_engineer.clone())
            .or_else(|| env::var("USER").ok())
            .or_else(|| env::var("USERNAME").ok())
    }

    /// Write the config file (unless `is_test`) and create the database file.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_name {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|e| AppError::Config(e.to_string()))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}
