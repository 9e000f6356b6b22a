use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    /// Required for the MySQL backend only.
    pub database_url: Option<String>,
    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,

    // Rate limiting
    pub rate_upload_per_min: u32,
    pub rate_calculate_per_min: u32,
    pub rate_default_per_min: u32,

    /// Largest accepted JSON or CSV upload body.
    pub max_upload_bytes: usize,
}

fn var_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow!("{} has invalid value {:?}: {}", key, raw, e))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend: StoreBackend = var_or("STORE_BACKEND", "mysql")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORE_BACKEND=mysql"));
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            store_backend,
            database_url,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: var_or("LOG_LEVEL", "debug")?,

            rate_upload_per_min: var_or("RATE_UPLOAD_PER_MIN", "30")?,
            rate_calculate_per_min: var_or("RATE_CALCULATE_PER_MIN", "60")?,
            rate_default_per_min: var_or("RATE_DEFAULT_PER_MIN", "1000")?,

            max_upload_bytes: var_or("MAX_UPLOAD_BYTES", "4194304")?, // 4 MiB
        })
    }
}

#[cfg(test)]
impl Config {
    /// In-memory configuration with generous limits.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            rate_upload_per_min: 1000,
            rate_calculate_per_min: 1000,
            rate_default_per_min: 1000,
            max_upload_bytes: 1024 * 1024,
        }
    }
}
