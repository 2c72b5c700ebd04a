//! Process configuration read from the environment.

use anyhow::{anyhow, bail, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub seed_categories: bool,
    /// Lets anonymous sign-ups request the `admin` role.
    pub allow_admin_signup: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let Some(jwt_secret) = get("JWT_SECRET") else {
            bail!("JWT_SECRET must be set");
        };
        let ttl_days: i64 = parse(get("TOKEN_TTL_DAYS"), "TOKEN_TTL_DAYS", 30)?;
        if ttl_days <= 0 {
            bail!("TOKEN_TTL_DAYS must be positive");
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            bind_addr: parse(get("BIND_ADDR"), "BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse(get("PORT"), "PORT", 8083)?,
            db_max_connections: parse(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            token_ttl: chrono::Duration::days(ttl_days),
            seed_categories: parse(get("SEED_CATEGORIES"), "SEED_CATEGORIES", false)?,
            allow_admin_signup: parse(get("ALLOW_ADMIN_SIGNUP"), "ALLOW_ADMIN_SIGNUP", true)?,
            log_format: parse(get("LOG_FORMAT"), "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e| anyhow!("invalid {key}={raw:?}: {e}")),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl.num_days())
            .field("seed_categories", &self.seed_categories)
            .field("allow_admin_signup", &self.allow_admin_signup)
            .field("log_format", &self.log_format)
            .finish()
    }
}
