//! Application configuration.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Locale configuration.
    #[serde(default)]
    pub locale: LocaleConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when opening or acquiring a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds an idle connection is kept before it is closed.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Seconds after which a connection is recycled.
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    /// Log every SQL statement at debug level.
    #[serde(default)]
    pub log_statements: bool,
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Locale used when the caller does not ask for one.
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Extra or overriding display strings, keyed by locale then by key.
    #[serde(default)]
    pub translations: HashMap<String, HashMap<String, String>>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            translations: HashMap::new(),
        }
    }
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_idle_timeout_secs() -> u64 {
    600
}

const fn default_max_lifetime_secs() -> u64 {
    1800
}

fn default_locale() -> String {
    "nb".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `HDO_ENV`)
    /// 3. Environment variables with `HDO__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("HDO_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HDO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("HDO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
