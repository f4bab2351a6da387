use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Server settings, read from `WARBLER_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub session_idle_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let port = var("WARBLER_PORT", "5000");
        let idle = var("WARBLER_SESSION_IDLE_MINUTES", "60");

        Ok(Self {
            db_path: var("WARBLER_DB_PATH", "warbler.db").into(),
            host: var("WARBLER_HOST", "0.0.0.0"),
            port: port
                .parse()
                .with_context(|| format!("WARBLER_PORT is not a port: {port}"))?,
            static_dir: var("WARBLER_STATIC_DIR", "./static").into(),
            session_idle_minutes: idle
                .parse()
                .with_context(|| format!("WARBLER_SESSION_IDLE_MINUTES is not a number: {idle}"))?,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
