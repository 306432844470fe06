//! Runtime configuration for producer and tool sessions

use std::time::Duration;

/// Default flush interval (50 ms)
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Default heartbeat interval (1 second)
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Heartbeats between two clock synchronizations (~once per minute)
pub const DEFAULT_SYNC_EVERY: u32 = 60;

/// Upper bound on any single call to the central service
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffered record count above which a growth warning is logged
pub const DEFAULT_BUFFER_WARN_THRESHOLD: usize = 10_000;

/// Configuration for a `ConnectionManager`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Interval between two flush cycles
    pub flush_interval: Duration,
    /// Interval between two pings
    pub heartbeat_interval: Duration,
    /// Number of heartbeats between clock synchronizations
    pub sync_every: u32,
    /// Timeout applied to ping, synchronize and publish calls
    pub request_timeout: Duration,
    /// Warn once the pending buffer grows beyond this many records
    pub buffer_warn_threshold: usize,
}

impl ClientConfig {
    /// Reject values that would spin or stall the session tasks
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.flush_interval.is_zero() {
            anyhow::bail!("flush_interval must be greater than zero");
        }
        if self.heartbeat_interval.is_zero() {
            anyhow::bail!("heartbeat_interval must be greater than zero");
        }
        if self.sync_every == 0 {
            anyhow::bail!("sync_every must be at least 1");
        }
        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than zero");
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            sync_every: DEFAULT_SYNC_EVERY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            buffer_warn_threshold: DEFAULT_BUFFER_WARN_THRESHOLD,
        }
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    pub fn sync_every(mut self, heartbeats: u32) -> Self {
        self.config.sync_every = heartbeats;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn buffer_warn_threshold(mut self, records: usize) -> Self {
        self.config.buffer_warn_threshold = records;
        self
    }

    pub fn build(self) -> anyhow::Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.flush_interval, Duration::from_millis(50));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(config.sync_every, 60);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfigBuilder::new()
            .flush_interval(Duration::from_millis(10))
            .heartbeat_interval(Duration::from_millis(20))
            .sync_every(3)
            .request_timeout(Duration::from_millis(200))
            .buffer_warn_threshold(5)
            .build()
            .unwrap();

        assert_eq!(config.flush_interval, Duration::from_millis(10));
        assert_eq!(config.heartbeat_interval, Duration::from_millis(20));
        assert_eq!(config.sync_every, 3);
        assert_eq!(config.request_timeout, Duration::from_millis(200));
        assert_eq!(config.buffer_warn_threshold, 5);
    }

    #[test]
    fn test_builder_rejects_zero_values() {
        assert!(ClientConfigBuilder::new()
            .flush_interval(Duration::ZERO)
            .build()
            .is_err());
        assert!(ClientConfigBuilder::new().sync_every(0).build().is_err());
        assert!(ClientConfigBuilder::new()
            .request_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_validate_literal_config() {
        assert!(ClientConfig::default().validate().is_ok());

        let config = ClientConfig {
            heartbeat_interval: Duration::ZERO,
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("heartbeat_interval"));
    }
}
