//! Environment configuration.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use mallbots_core::snapshot::SnapshotPolicy;
use mallbots_stores::module::StoresConfig;

use crate::error::AppError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line human readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PostgreSQL connection string; in-memory storage when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: u32,
    /// Snapshot and publish settings for the Stores module.
    pub stores: StoresConfig,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DATABASE_URL` | unset (in-memory storage) |
    /// | `DATABASE_MAX_CONNECTIONS` | 10 |
    /// | `SNAPSHOT_EVERY` | 3 (`0` disables snapshots) |
    /// | `PUBLISH_TIMEOUT_MS` | 5000 (`0` disables the timeout) |
    /// | `LOG_FORMAT` | `json` |
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections: u32 = parse(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        if database_max_connections == 0 {
            return Err(AppError::Config(
                "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
            ));
        }

        let snapshot_every: i64 = parse(&lookup, "SNAPSHOT_EVERY", 3)?;
        let snapshot_policy = match snapshot_every {
            0 => SnapshotPolicy::Never,
            1 => SnapshotPolicy::Always,
            n if n > 1 => SnapshotPolicy::EveryNVersions(n),
            _ => {
                return Err(AppError::Config(
                    "SNAPSHOT_EVERY must not be negative".into(),
                ));
            }
        };

        let publish_timeout_ms: u64 = parse(&lookup, "PUBLISH_TIMEOUT_MS", 5000)?;
        let publish_timeout =
            (publish_timeout_ms > 0).then_some(Duration::from_millis(publish_timeout_ms));

        let log_format = parse(&lookup, "LOG_FORMAT", LogFormat::Json)?;

        Ok(Self {
            database_url,
            database_max_connections,
            stores: StoresConfig {
                snapshot_policy,
                publish_timeout,
            },
            log_format,
        })
    }
}

fn parse<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        _ => Ok(default),
    }
}
