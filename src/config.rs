use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub quota: QuotaConfig,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Daily quota configuration.
///
/// Loaded once at startup and immutable afterwards. These values only seed
/// the `service_query_limits` row the first time a service is seen; admins
/// can override any service later via the set-limit endpoint.
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Fallback daily limit for services without a per-service default
    pub default_daily_limit: i32,
    /// Per-service default daily limits, e.g. intelx=25
    pub service_defaults: HashMap<String, i32>,
    /// When true, the first call of the day is always allowed, even if the
    /// configured limit is 0. Matches the historical limiter behavior;
    /// disable for a strict "limit 0 means deny" policy.
    pub zero_limit_grace: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            quota: QuotaConfig::from_env(),
        })
    }
}

impl QuotaConfig {
    /// Load quota configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            default_daily_limit: env::var("QUOTA_DEFAULT_DAILY_LIMIT")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .unwrap_or(200),
            service_defaults: env::var("QUOTA_SERVICE_DEFAULTS")
                .map(|v| Self::parse_service_defaults(&v))
                .unwrap_or_default(),
            zero_limit_grace: env::var("QUOTA_ZERO_LIMIT_GRACE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// Parses a comma-separated list of `service=limit` pairs.
    ///
    /// Malformed entries are skipped rather than failing startup.
    pub fn parse_service_defaults(raw: &str) -> HashMap<String, i32> {
        raw.split(',')
            .filter_map(|pair| {
                let (service, limit) = pair.split_once('=')?;
                let service = service.trim();
                let limit: i32 = limit.trim().parse().ok()?;
                if service.is_empty() || limit < 0 {
                    return None;
                }
                Some((service.to_string(), limit))
            })
            .collect()
    }

    /// Effective default limit for a service seen for the first time
    pub fn default_limit_for(&self, service: &str) -> i32 {
        self.service_defaults
            .get(service)
            .copied()
            .unwrap_or(self.default_daily_limit)
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            acquire_timeout: Duration::from_secs(
                env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            ),
            idle_timeout: Duration::from_secs(
                env::var("DATABASE_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .unwrap_or(600),
            ),
            max_lifetime: Duration::from_secs(
                env::var("DATABASE_MAX_LIFETIME_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse()
                    .unwrap_or(1800),
            ),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
