use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Which record store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MongoDb,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDb),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Upper bound for `JWT_EXPIRATION_HOURS` (one year).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be set")]
    Missing { key: &'static str },
}

/// Initial administrator created at startup when `SEED_ADMIN=true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub storage_backend: StorageBackend,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_expiration_hours: i64 =
            parse("JWT_EXPIRATION_HOURS", var("JWT_EXPIRATION_HOURS", "24"))?;
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&jwt_expiration_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION_HOURS",
                value: jwt_expiration_hours.to_string(),
            });
        }

        let seed_admin: bool = parse("SEED_ADMIN", var("SEED_ADMIN", "false"))?;
        let admin_seed = if seed_admin {
            Some(AdminSeed {
                email: var("ADMIN_EMAIL", "admin@example.com").to_lowercase(),
                user_name: var("ADMIN_USERNAME", "admin"),
                password: lookup("ADMIN_PASSWORD").ok_or(ConfigError::Missing {
                    key: "ADMIN_PASSWORD",
                })?,
            })
        } else {
            None
        };

        Ok(Self {
            server_host: var("SERVER_HOST", "127.0.0.1"),
            server_port: parse("SERVER_PORT", var("SERVER_PORT", "8080"))?,
            storage_backend: var("STORAGE_BACKEND", "mongodb").parse()?,
            mongodb_uri: var("MONGODB_URI", "mongodb://localhost:27017"),
            database_name: var("DATABASE_NAME", "community_hub"),
            jwt_secret: var("JWT_SECRET", "your-super-secret-jwt-key-change-in-production"),
            jwt_expiration_hours,
            bcrypt_cost: parse(
                "BCRYPT_COST",
                var("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string()),
            )?,
            admin_seed,
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
