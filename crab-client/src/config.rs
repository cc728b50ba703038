//! Client configuration
//!
//! Builder-style structs with environment loading. Every value has a
//! default; an unparsable environment value is logged and ignored.

use crab_orders::RoundingMode;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Sync timing and reconnect policy
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound for one sync request
    pub timeout: Duration,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
    pub backoff_multiplier: f64,
    /// Reconnect attempts before giving up; `None` retries forever
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            backoff_initial: Duration::from_millis(500),
            backoff_max: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_reconnect_attempts: None,
        }
    }
}

impl SyncConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration, multiplier: f64) -> Self {
        self.backoff_initial = initial;
        self.backoff_max = max;
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = Some(attempts);
        self
    }
}

/// Inputs for local rule evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingConfig {
    pub rounding: RoundingMode,
    /// Store-local offset used for rule schedules
    pub utc_offset_minutes: i32,
}

/// Logging output
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Daily rolling file output when set
    pub dir: Option<PathBuf>,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            dir: None,
            json: false,
        }
    }
}

/// Client configuration for connecting to the order server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// HTTP request timeout in seconds
    pub timeout: u64,

    /// Directory holding the local replica database
    pub data_dir: PathBuf,

    pub sync: SyncConfig,
    pub pricing: PricingConfig,
    pub log: LogConfig,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            data_dir: PathBuf::from("./data"),
            sync: SyncConfig::default(),
            pricing: PricingConfig::default(),
            log: LogConfig::default(),
        }
    }

    /// Load from the process environment (and `.env` if present)
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();

        let mut config = Self::new(
            std::env::var("CRAB_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        config.token = std::env::var("CRAB_TOKEN").ok().filter(|t| !t.is_empty());
        if let Ok(dir) = std::env::var("CRAB_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        let sync = &mut config.sync;
        if let Some(ms) = env_parse::<u64>("CRAB_SYNC_TIMEOUT_MS") {
            sync.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("CRAB_BACKOFF_INITIAL_MS") {
            sync.backoff_initial = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("CRAB_BACKOFF_MAX_MS") {
            sync.backoff_max = Duration::from_millis(ms);
        }
        if let Some(m) = env_parse::<f64>("CRAB_BACKOFF_MULTIPLIER").filter(|m| *m >= 1.0) {
            sync.backoff_multiplier = m;
        }
        sync.max_reconnect_attempts = env_parse("CRAB_MAX_RECONNECT_ATTEMPTS");

        if let Some(offset) = env_parse("CRAB_UTC_OFFSET_MINUTES") {
            config.pricing.utc_offset_minutes = offset;
        }
        if let Some(mode) = env_parse::<RoundingMode>("CRAB_ROUNDING_MODE") {
            config.pricing.rounding = mode;
        }

        if let Ok(level) = std::env::var("CRAB_LOG_LEVEL") {
            config.log.level = level;
        }
        config.log.dir = std::env::var("CRAB_LOG_DIR").ok().map(PathBuf::from);
        if let Some(json) = env_parse("CRAB_LOG_JSON") {
            config.log.json = json;
        }

        config
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Path of the replica database inside `data_dir`
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("replica.redb")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Invalid environment value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.sync.timeout, Duration::from_secs(10));
        assert_eq!(config.pricing.rounding, RoundingMode::HalfUp);
        assert!(config.database_path().ends_with("replica.redb"));
    }

    #[test]
    fn test_invalid_env_value_falls_back() {
        // SAFETY: single-threaded access to a test-only variable
        unsafe { std::env::set_var("CRAB_TEST_BAD_NUMBER", "ten") };
        assert_eq!(env_parse::<u64>("CRAB_TEST_BAD_NUMBER"), None);
        unsafe { std::env::set_var("CRAB_TEST_GOOD_NUMBER", " 25 ") };
        assert_eq!(env_parse::<u64>("CRAB_TEST_GOOD_NUMBER"), Some(25));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://pos:9000")
            .with_token("t")
            .with_sync(SyncConfig::default().with_max_reconnect_attempts(3));
        assert_eq!(config.token.as_deref(), Some("t"));
        assert_eq!(config.sync.max_reconnect_attempts, Some(3));
    }
}
