use std::time::Duration;

use chairbook_core::availability::{
    granularity, DEFAULT_MAX_RANGE_DAYS, DEFAULT_SLOT_GRANULARITY_MINS,
};
use chairbook_core::booking::SchedulingError;
use chairbook_core::reservation::DEFAULT_LOCK_HOLD_MINS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Slot, lock and range limits used by the scheduling endpoints.
    pub scheduling: SchedulingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_or("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs = env_or("SHUTDOWN_TIMEOUT_SECS", 30);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            scheduling: SchedulingConfig::from_env(),
        }
    }
}

/// Tunables of the availability calculator and the lock manager.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Default slot length in minutes.
    pub slot_granularity_mins: i64,
    /// How long a checkout lock holds a slot, in minutes.
    pub lock_hold_mins: i64,
    /// Period of the expired-lock sweeper, in seconds.
    pub lock_sweep_interval_secs: u64,
    /// Longest date range accepted by slot listings, in days.
    pub max_availability_range_days: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_granularity_mins: DEFAULT_SLOT_GRANULARITY_MINS,
            lock_hold_mins: DEFAULT_LOCK_HOLD_MINS,
            lock_sweep_interval_secs: 60,
            max_availability_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

impl SchedulingConfig {
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `SLOT_GRANULARITY_MINS`       | `30`    |
    /// | `LOCK_HOLD_MINS`              | `7`     |
    /// | `LOCK_SWEEP_INTERVAL_SECS`    | `60`    |
    /// | `MAX_AVAILABILITY_RANGE_DAYS` | `62`    |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values or a granularity outside 1..=1440.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            slot_granularity_mins: env_or("SLOT_GRANULARITY_MINS", defaults.slot_granularity_mins),
            lock_hold_mins: env_or("LOCK_HOLD_MINS", defaults.lock_hold_mins),
            lock_sweep_interval_secs: env_or(
                "LOCK_SWEEP_INTERVAL_SECS",
                defaults.lock_sweep_interval_secs,
            ),
            max_availability_range_days: env_or(
                "MAX_AVAILABILITY_RANGE_DAYS",
                defaults.max_availability_range_days,
            ),
        };
        assert!(config.lock_hold_mins > 0, "LOCK_HOLD_MINS must be positive");
        assert!(
            config.lock_sweep_interval_secs > 0,
            "LOCK_SWEEP_INTERVAL_SECS must be positive"
        );
        if let Err(e) = granularity(config.slot_granularity_mins) {
            panic!("SLOT_GRANULARITY_MINS: {e}");
        }
        config
    }

    /// Slot step, optionally overridden per request.
    pub fn slot_step(&self, override_mins: Option<i64>) -> Result<chrono::Duration, SchedulingError> {
        granularity(override_mins.unwrap_or(self.slot_granularity_mins))
    }

    pub fn lock_hold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lock_hold_mins)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.lock_sweep_interval_secs)
    }
}

/// Parse an env var, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid number: {e}")),
        Err(_) => default,
    }
}
