//! Process configuration, assembled from the environment.

use crate::env_config::env_parse_with_default;

/// Runtime configuration for the courier process.
///
/// Every knob is externally supplied; the defaults match the baseline
/// deployment (30s retry interval, batches of 10, port 3000).
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string for the pending store.
    pub database_url: String,
    /// Bind host for the ingestion listener.
    pub http_host: String,
    /// Bind port for the ingestion listener.
    pub http_port: u16,
    /// Base URL of the channel gateway. Required for `serve`.
    pub gateway_url: Option<String>,
    /// Optional bearer token for the gateway.
    pub gateway_token: Option<String>,
    /// Period between retry cycles, in seconds.
    pub retry_interval_secs: u64,
    /// Maximum pending entries processed per retry cycle.
    pub retry_batch_limit: usize,
    /// Failed retries before a message is dead-lettered. 0 = retry forever.
    pub max_attempts: u32,
    /// Upper bound on a single gateway send, in seconds.
    pub send_timeout_secs: u64,
    /// Period between channel status probes, in seconds.
    pub status_poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://courier.db".to_owned(),
            http_host: "127.0.0.1".to_owned(),
            http_port: 3000,
            gateway_url: None,
            gateway_token: None,
            retry_interval_secs: 30,
            retry_batch_limit: 10,
            max_attempts: 0,
            send_timeout_secs: 30,
            status_poll_interval_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from `COURIER_*` environment variables.
    ///
    /// Unset variables fall back to defaults; set-but-invalid numeric
    /// values log a warning and fall back (never abort startup for a typo
    /// in a tuning knob; a bad `database_url` will fail loudly at connect).
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("COURIER_DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.database_url),
            http_host: std::env::var("COURIER_HOST")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.http_host),
            http_port: env_parse_with_default("COURIER_PORT", defaults.http_port),
            gateway_url: std::env::var("COURIER_GATEWAY_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            gateway_token: std::env::var("COURIER_GATEWAY_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            retry_interval_secs: env_parse_with_default(
                "COURIER_RETRY_INTERVAL_SECS",
                defaults.retry_interval_secs,
            ),
            retry_batch_limit: env_parse_with_default(
                "COURIER_RETRY_BATCH_LIMIT",
                defaults.retry_batch_limit,
            ),
            max_attempts: env_parse_with_default("COURIER_MAX_ATTEMPTS", defaults.max_attempts),
            send_timeout_secs: env_parse_with_default(
                "COURIER_SEND_TIMEOUT_SECS",
                defaults.send_timeout_secs,
            ),
            status_poll_interval_secs: env_parse_with_default(
                "COURIER_STATUS_POLL_SECS",
                defaults.status_poll_interval_secs,
            ),
        }
    }

    /// Whether failed retries should be counted toward a dead-letter bound.
    #[must_use]
    pub fn bounded_retries(&self) -> bool {
        self.max_attempts > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.http_port, 3000);
        assert_eq!(cfg.retry_interval_secs, 30);
        assert_eq!(cfg.retry_batch_limit, 10);
        assert_eq!(cfg.max_attempts, 0);
        assert!(!cfg.bounded_retries());
        assert!(cfg.gateway_url.is_none());
    }

    #[test]
    fn test_from_env_overrides() {
        unsafe {
            std::env::set_var("COURIER_PORT", "8080");
            std::env::set_var("COURIER_RETRY_BATCH_LIMIT", "3");
            std::env::set_var("COURIER_MAX_ATTEMPTS", "5");
        }
        let cfg = Config::from_env();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.retry_batch_limit, 3);
        assert_eq!(cfg.max_attempts, 5);
        assert!(cfg.bounded_retries());
        unsafe {
            std::env::remove_var("COURIER_PORT");
            std::env::remove_var("COURIER_RETRY_BATCH_LIMIT");
            std::env::remove_var("COURIER_MAX_ATTEMPTS");
        }
    }

    #[test]
    fn test_from_env_invalid_value_falls_back() {
        unsafe { std::env::set_var("COURIER_RETRY_INTERVAL_SECS", "soon") };
        let cfg = Config::from_env();
        assert_eq!(cfg.retry_interval_secs, 30);
        unsafe { std::env::remove_var("COURIER_RETRY_INTERVAL_SECS") };
    }
}
