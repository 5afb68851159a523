use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_OSRM_URL: &str = "http://localhost:5000";
const DEFAULT_OSRM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CORRIDOR_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub osrm_url: String,
    pub osrm_timeout: Duration,
    pub database_url: String,
    pub db_max_connections: u32,
    pub corridor_timeout: Duration,
}

impl AppConfig {
    /// `DATABASE_URL` is required, everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), || DEFAULT_BIND_ADDR)?;
        let osrm_url = lookup("OSRM_URL").unwrap_or_else(|| DEFAULT_OSRM_URL.to_string());
        let osrm_timeout = Duration::from_secs(parse_or(
            "OSRM_TIMEOUT_SECS",
            lookup("OSRM_TIMEOUT_SECS"),
            || DEFAULT_OSRM_TIMEOUT_SECS,
        )?);
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            lookup("DB_MAX_CONNECTIONS"),
            || DEFAULT_DB_MAX_CONNECTIONS,
        )?;
        let corridor_timeout = Duration::from_secs(parse_or(
            "CORRIDOR_TIMEOUT_SECS",
            lookup("CORRIDOR_TIMEOUT_SECS"),
            || DEFAULT_CORRIDOR_TIMEOUT_SECS,
        )?);

        Ok(Self {
            bind_addr,
            osrm_url,
            osrm_timeout,
            database_url,
            db_max_connections,
            corridor_timeout,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default()),
    }
}
