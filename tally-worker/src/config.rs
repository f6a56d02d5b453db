/// Configuration for the worker
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `TICK_INTERVAL_SECS`: Seconds between materializer ticks (default: 60)
/// - `RUN_MIGRATIONS`: Apply pending migrations at startup (default: true)
/// - `RUST_LOG`: Log filter (default: tally_worker=debug)

use std::env;

use crate::scheduler::SchedulerConfig;

/// Worker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Seconds between ticks
    pub tick_interval_secs: u64,

    /// Whether to run migrations before the first tick
    pub run_migrations: bool,
}

impl WorkerConfig {
    /// Loads configuration from the environment (and `.env`, if present)
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a value does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()?;

        let tick_interval_secs = lookup("TICK_INTERVAL_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse::<u64>()?;
        if tick_interval_secs == 0 {
            anyhow::bail!("TICK_INTERVAL_SECS must be greater than zero");
        }

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            None => true,
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow::anyhow!("RUN_MIGRATIONS must be true or false, got {}", value))?,
        };

        Ok(Self {
            database_url,
            max_connections,
            tick_interval_secs,
            run_migrations,
        })
    }

    /// Scheduler settings derived from this configuration
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval_secs: self.tick_interval_secs,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            WorkerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgresql://localhost/tally")]))
                .unwrap();

        assert_eq!(config.database_url, "postgresql://localhost/tally");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.tick_interval_secs, 60);
        assert!(config.run_migrations);
        assert_eq!(config.scheduler().tick_interval_secs, 60);
    }

    #[test]
    fn test_overrides() {
        let config = WorkerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://db/tally"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("TICK_INTERVAL_SECS", "5"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.tick_interval_secs, 5);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_missing_database_url() {
        let err = WorkerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = WorkerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://db/tally"),
            ("TICK_INTERVAL_SECS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_flag_rejected() {
        let result = WorkerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://db/tally"),
            ("RUN_MIGRATIONS", "sometimes"),
        ]));
        assert!(result.is_err());
    }
}
