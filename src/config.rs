//! Process configuration loaded from environment variables.

use crate::task::services::{ForeignIdPolicy, ReorderPolicy};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Default HTTP listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Default size of the database connection pool.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Configuration error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    /// A variable is set but cannot be parsed.
    #[error("failed to parse environment variable '{key}': {details}")]
    ParseError {
        /// Variable name.
        key: String,
        /// Parser message.
        details: String,
    },
}

/// Deployment environment selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development; human-readable logs.
    Development,
    /// Production; JSON logs.
    Production,
}

impl Environment {
    /// Reads `APP_ENV`; anything but `production` means development.
    #[must_use]
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");
        if app_env.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Returns whether this is the production environment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Configuration that can be loaded from environment variables.
pub trait FromEnv: Sized {
    /// Loads the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or malformed.
    fn from_env() -> Result<Self, ConfigError>;
}

/// Returns the variable's value or `default` when it is unset.
#[must_use]
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Returns the variable's value.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when it is unset or empty.
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError::ParseError {
        key: key.to_owned(),
        details: err.to_string(),
    })
}

/// `PostgreSQL` connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,
    /// Maximum pool size.
    pub pool_size: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Settings of the `tasklist` process.
///
/// Environment variables:
/// - `APP_ENV` (optional, default: `development`)
/// - `TASKLIST_BIND_ADDR` (optional, default: `0.0.0.0:5000`)
/// - `DATABASE_URL` (optional; unset selects the in-memory store)
/// - `DATABASE_POOL_SIZE` (optional, default: 8)
/// - `JWT_SECRET` (required)
/// - `TASKLIST_REORDER_FOREIGN_IDS` (optional, `reject` or `ignore`)
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment environment.
    pub environment: Environment,
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// Database settings; `None` keeps everything in memory.
    pub database: Option<DatabaseConfig>,
    /// Secret verifying bearer tokens.
    pub jwt_secret: String,
    /// Handling of foreign ids in explicit reorders.
    pub foreign_ids: ForeignIdPolicy,
}

impl AppConfig {
    /// Returns the reorder policy implied by this configuration.
    #[must_use]
    pub fn reorder_policy(&self) -> ReorderPolicy {
        ReorderPolicy::default().with_foreign_ids(self.foreign_ids)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("bind_addr", &self.bind_addr)
            .field("database", &self.database)
            .field("jwt_secret", &"<redacted>")
            .field("foreign_ids", &self.foreign_ids)
            .finish()
    }
}

impl FromEnv for AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = parse_var(
            "TASKLIST_BIND_ADDR",
            &env_or_default("TASKLIST_BIND_ADDR", DEFAULT_BIND_ADDR),
        )?;

        let database = match env_required("DATABASE_URL") {
            Ok(url) => Some(DatabaseConfig {
                url,
                pool_size: parse_var(
                    "DATABASE_POOL_SIZE",
                    &env_or_default("DATABASE_POOL_SIZE", &DEFAULT_POOL_SIZE.to_string()),
                )?,
            }),
            Err(_) => None,
        };

        let foreign_ids = parse_var(
            "TASKLIST_REORDER_FOREIGN_IDS",
            &env_or_default("TASKLIST_REORDER_FOREIGN_IDS", "reject"),
        )?;

        Ok(Self {
            environment: Environment::from_env(),
            bind_addr,
            database,
            jwt_secret: env_required("JWT_SECRET")?,
            foreign_ids,
        })
    }
}
