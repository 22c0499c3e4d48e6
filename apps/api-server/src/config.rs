//! Application configuration loaded from environment variables.

use std::env;

use roster_infra::auth::{BCRYPT_COST_RANGE, DEFAULT_BCRYPT_COST};
use roster_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory user store.
    pub database: Option<DatabaseConfig>,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails when `BCRYPT_COST` is set to something bcrypt cannot use.
    pub fn from_env() -> std::io::Result<Self> {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            bcrypt_cost: parse_bcrypt_cost(env::var("BCRYPT_COST").ok().as_deref())?,
        })
    }
}

fn parse_bcrypt_cost(raw: Option<&str>) -> std::io::Result<u32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_BCRYPT_COST);
    };

    match raw.trim().parse::<u32>() {
        Ok(cost) if BCRYPT_COST_RANGE.contains(&cost) => Ok(cost),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "BCRYPT_COST must be an integer in {}..={}, got {:?}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                raw
            ),
        )),
    }
}
