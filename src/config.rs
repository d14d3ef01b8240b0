use std::{env, fmt, net::SocketAddr, str::FromStr};

use log::{info, warn};

use crate::{
    constants::{
        DEFAULT_BIND_ADDRESS, DEFAULT_MAX_CONNECTIONS, DEFAULT_SESSION_LIFETIME_MINUTES,
        GENERATED_SECRET_CHARS, MAX_SESSION_LIFETIME_MINUTES,
    },
    cryptography::generate_secret,
};

#[derive(Debug)]
pub struct ConfigError {
    info: String,
}

impl ConfigError {
    fn new(info: String) -> Self {
        Self { info }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid configuration: {}", self.info)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Without a database the in-memory store is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Always within `1..=MAX_SESSION_LIFETIME_MINUTES`.
    pub session_lifetime_minutes: i64,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if database_url.is_none() => {
                warn!("JWT_SECRET not set, generated a secret valid for this process only");
                generate_secret(GENERATED_SECRET_CHARS)
            }
            None => {
                return Err(ConfigError::new(
                    "JWT_SECRET is required when DATABASE_URL is set".to_string(),
                ))
            }
        };

        let session_lifetime_minutes: i64 = try_load(
            &lookup,
            "SESSION_LIFETIME_MINUTES",
            &DEFAULT_SESSION_LIFETIME_MINUTES.to_string(),
        )?;
        if !(1..=MAX_SESSION_LIFETIME_MINUTES).contains(&session_lifetime_minutes) {
            return Err(ConfigError::new(format!(
                "SESSION_LIFETIME_MINUTES: must be between 1 and {MAX_SESSION_LIFETIME_MINUTES}"
            )));
        }

        Ok(Self {
            bind_address: try_load(&lookup, "BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?,
            database_max_connections: try_load(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                &DEFAULT_MAX_CONNECTIONS.to_string(),
            )?,
            session_lifetime_minutes,
            database_url,
            jwt_secret,
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| ConfigError::new(format!("{key}: {e}")))
}
