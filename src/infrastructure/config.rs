//! Startup configuration: MySQL credentials from the environment, everything
//! else from an optional TOML file.

use crate::data::user_client::DEFAULT_USER_SERVICE_URL;
use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "ACCOUNT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("Failed to load config file: {0}")]
    File(#[from] figment::Error),
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: Secret<String>,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserServiceConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl UserServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: u32,
}

/// Shape of the config file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub user_service: UserServiceConfig,
    pub database: PoolConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            user_service: UserServiceConfig {
                url: DEFAULT_USER_SERVICE_URL.to_string(),
                timeout_secs: 10,
            },
            database: PoolConfig { max_connections: 5 },
        }
    }
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Figment::from(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()?;
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub user_service: UserServiceConfig,
}

impl AppConfig {
    /// Reads the config file named by `ACCOUNT_CONFIG` (or `config.toml`) and
    /// the `MYSQL_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path, |name| std::env::var(name).ok())
    }

    pub fn load_from<F>(path: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = FileConfig::load(path)?;
        let required = |name: &'static str| env(name).ok_or(ConfigError::MissingEnv(name));

        let port_raw = required("MYSQL_PORT")?;
        let port = port_raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: "MYSQL_PORT",
            value: port_raw.clone(),
        })?;

        Ok(Self {
            database: DatabaseConfig {
                user: required("MYSQL_USER")?,
                password: Secret::new(required("MYSQL_PASS")?),
                name: required("MYSQL_DBNAME")?,
                host: required("MYSQL_HOST")?,
                port,
                max_connections: file.database.max_connections,
            },
            server: file.server,
            user_service: file.user_service,
        })
    }
}
