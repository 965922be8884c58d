use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ServerError;

pub const BIND_ADDR_ENV: &str = "A2A_BIND_ADDR";
pub const STREAM_IDLE_TIMEOUT_ENV: &str = "A2A_STREAM_IDLE_TIMEOUT_SECS";

/// Runtime settings for an A2A server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// How long a stream waits in silence before checking whether the
    /// executor has already finished.
    pub stream_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            stream_idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `A2A_BIND_ADDR` and `A2A_STREAM_IDLE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            config.bind_addr = addr
                .trim()
                .parse()
                .map_err(|e| ServerError::Config(format!("{BIND_ADDR_ENV}={addr}: {e}")))?;
        }
        if let Some(secs) = lookup(STREAM_IDLE_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                ServerError::Config(format!("{STREAM_IDLE_TIMEOUT_ENV}={secs}: {e}"))
            })?;
            if secs == 0 {
                return Err(ServerError::Config(format!(
                    "{STREAM_IDLE_TIMEOUT_ENV} must be greater than zero"
                )));
            }
            config.stream_idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }
}
