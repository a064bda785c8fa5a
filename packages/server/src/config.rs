//! Server configuration.

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::code_runner::piston::DEFAULT_PISTON_URL;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TYPING_TTL_SECS: u64 = 10;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_CODE_RUNNER_TIMEOUT_SECS: u64 = 30;

/// Invalid server configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Runtime settings of the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Keep-alive interval of an idle event stream
    pub idle_timeout: Duration,
    /// Period of the presence reconciler
    pub reconcile_interval: Duration,
    /// Typing indicators older than this are expired
    pub typing_ttl: Duration,
    /// Capacity of each participant's event channel
    pub channel_capacity: usize,
    pub code_runner_url: String,
    pub code_runner_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            reconcile_interval: Duration::from_secs(DEFAULT_RECONCILE_INTERVAL_SECS),
            typing_ttl: Duration::from_secs(DEFAULT_TYPING_TTL_SECS),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            code_runner_url: DEFAULT_PISTON_URL.to_string(),
            code_runner_timeout: Duration::from_secs(DEFAULT_CODE_RUNNER_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Durations and the channel capacity must be non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_timeout.is_zero() {
            return Err(ConfigError::Zero("idle timeout"));
        }
        if self.reconcile_interval.is_zero() {
            return Err(ConfigError::Zero("reconcile interval"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Zero("channel capacity"));
        }
        Ok(())
    }
}
