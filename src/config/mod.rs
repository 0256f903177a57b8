use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_in;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Which remote backend the gateway factory should build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Probe `GET /health` once at startup; fall back to the simulator.
    #[default]
    Auto,
    Http,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub backend: BackendMode,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_simulated_latency")]
    pub simulated_latency_ms: u64,
    /// JSON file backing the simulated server; `None` keeps it in memory.
    #[serde(default)]
    pub simulated_store: Option<String>,
}

/// Keys every current config file is expected to carry.
pub const CONFIG_KEYS: &[&str] = &[
    "database",
    "server_url",
    "backend",
    "request_timeout_secs",
    "simulated_latency_ms",
    "simulated_store",
];

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_simulated_latency() -> u64 {
    150
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            server_url: default_server_url(),
            backend: BackendMode::default(),
            request_timeout_secs: default_request_timeout(),
            simulated_latency_ms: default_simulated_latency(),
            simulated_store: Some(Self::simulated_store_file().to_string_lossy().to_string()),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rtimetracker")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rtimetracker")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtimetracker.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtimetracker.sqlite")
    }

    pub fn simulated_store_file() -> PathBuf {
        Self::config_dir().join("simulated_server.json")
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        Ok(cfg)
    }

    /// Keys from [`CONFIG_KEYS`] absent in the file on disk (defaults apply).
    pub fn missing_keys() -> AppResult<Vec<&'static str>> {
        let path = Self::config_file();
        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;

        let Some(map) = yaml.as_mapping() else {
            return Ok(CONFIG_KEYS.to_vec());
        };

        Ok(CONFIG_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(serde_yaml::Value::String(k.to_string())))
            .collect())
    }

    /// Initialize configuration directory, config file and database file.
    /// In test mode the config file on disk is left untouched.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => resolve_in(&dir, &name),
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            fs::write(Self::config_file(), yaml)?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
