use std::env;

use crate::errors::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://data.db?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings, read once at startup and handed to the services that need them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
    pub workers: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. `from_env` is the only production caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| AppError::Config("JWT_SECRET must be set".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET cannot be empty".to_string()));
        }

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost = raw
                    .parse::<u32>()
                    .map_err(|_| AppError::Config(format!("Invalid BCRYPT_COST: {}", raw)))?;
                if !(4..=31).contains(&cost) {
                    return Err(AppError::Config("BCRYPT_COST must be between 4 and 31".to_string()));
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", raw)))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let workers = match lookup("WORKERS") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("Invalid WORKERS: {}", raw)))?,
            None => num_cpus::get(),
        };

        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            jwt_secret,
            bcrypt_cost,
            db_max_connections,
            workers,
        })
    }
}
