use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use strum_macros::{AsRefStr, EnumString};

use crate::attendance::resolver::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    Memory,
    File,
    Mysql,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Attendance storage
    pub store_backend: StoreKind,
    pub store_path: PathBuf,
    pub database_url: Option<String>,

    pub recent_limit: usize,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes `std::env`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store_backend = StoreKind::from_str(&var("STORE_BACKEND", "file"))
            .map_err(|_| anyhow!("STORE_BACKEND must be one of memory, file, mysql"))?;

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreKind::Mysql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND=mysql");
        }

        Ok(Self {
            server_addr: var("SERVER_ADDR", "127.0.0.1:8080"),
            jwt_secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            api_prefix: var("API_PREFIX", "/api"),

            rate_protected_per_min: var("RATE_PROTECTED_PER_MIN", "1000")
                .parse()
                .context("RATE_PROTECTED_PER_MIN must be a number")?,

            store_backend,
            store_path: PathBuf::from(var("STORE_PATH", "data/attendance.json")),
            database_url,

            recent_limit: lookup("RECENT_LIMIT")
                .map(|v| v.parse())
                .transpose()
                .context("RECENT_LIMIT must be a number")?
                .unwrap_or(DEFAULT_RECENT_LIMIT),
            log_dir: PathBuf::from(var("LOG_DIR", "logs")),
        })
    }
}
