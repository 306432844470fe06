//! Producer configuration

use anyhow::{Context, Result};
use logcentral_lib::transport::TlsConfig;
use logcentral_lib::{ClientConfig, ClientConfigBuilder, GrpcConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Producer configuration, read from `LOGCENTRAL_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Producer name; empty lets the service generate one
    #[serde(default)]
    pub name: String,

    /// Central service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API server port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Heartbeats between clock synchronizations
    #[serde(default = "default_sync_every")]
    pub sync_every: u32,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Forward every line, whatever the tag filter says
    #[serde(default)]
    pub ignore_filter: bool,

    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    #[serde(default)]
    pub client_cert: Option<PathBuf>,
    #[serde(default)]
    pub client_key: Option<PathBuf>,

    /// Initial delay between connection attempts, also used to reopen
    /// push streams
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:7400".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_flush_interval_ms() -> u64 {
    50
}

fn default_heartbeat_interval_ms() -> u64 {
    1000
}

fn default_sync_every() -> u32 {
    60
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

impl ProducerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("LOGCENTRAL").try_parsing(true))
    }

    pub fn from_source(source: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid LOGCENTRAL_* configuration")
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Runtime settings of the connection manager
    pub fn client_config(&self) -> Result<ClientConfig> {
        ClientConfigBuilder::new()
            .flush_interval(Duration::from_millis(self.flush_interval_ms))
            .heartbeat_interval(Duration::from_millis(self.heartbeat_interval_ms))
            .sync_every(self.sync_every)
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .build()
    }

    /// Transport settings; TLS is enabled when a CA certificate is set
    pub fn grpc_config(&self) -> Result<GrpcConfig> {
        let mut builder = GrpcConfig::builder()
            .endpoint(self.endpoint.clone())
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .reopen_backoff(self.initial_backoff(), self.max_backoff());

        if let Some(ca_cert_path) = &self.ca_cert {
            builder = builder.tls(TlsConfig {
                ca_cert_path: ca_cert_path.clone(),
                client_cert_path: self.client_cert.clone(),
                client_key_path: self.client_key.clone(),
            });
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ProducerConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ProducerConfig::from_source(
            config::Environment::with_prefix("LOGCENTRAL")
                .try_parsing(true)
                .source(Some(map)),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.name, "");
        assert_eq!(config.endpoint, "http://localhost:7400");
        assert_eq!(config.api_port, 8080);
        assert!(!config.ignore_filter);
        assert_eq!(config.initial_backoff(), Duration::from_secs(1));
        assert_eq!(config.max_backoff(), Duration::from_secs(60));

        let client = config.client_config().unwrap();
        assert_eq!(client.flush_interval, Duration::from_millis(50));
        assert_eq!(client.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(client.sync_every, 60);
        let grpc = config.grpc_config().unwrap();
        assert!(grpc.tls.is_none());
        assert_eq!(grpc.reopen_backoff.initial, Duration::from_secs(1));
        assert_eq!(grpc.reopen_backoff.max, Duration::from_secs(60));
    }

    #[test]
    fn test_environment_overrides() {
        let config = from_vars(&[
            ("LOGCENTRAL_NAME", "app1"),
            ("LOGCENTRAL_ENDPOINT", "https://logs.internal:7400"),
            ("LOGCENTRAL_API_PORT", "9100"),
            ("LOGCENTRAL_FLUSH_INTERVAL_MS", "25"),
            ("LOGCENTRAL_IGNORE_FILTER", "true"),
            ("LOGCENTRAL_CA_CERT", "/etc/logcentral/ca.crt"),
        ])
        .unwrap();

        assert_eq!(config.name, "app1");
        assert_eq!(config.api_port, 9100);
        assert!(config.ignore_filter);
        assert_eq!(
            config.client_config().unwrap().flush_interval,
            Duration::from_millis(25)
        );

        let grpc = config.grpc_config().unwrap();
        assert_eq!(grpc.endpoint, "https://logs.internal:7400");
        assert_eq!(
            grpc.tls.unwrap().ca_cert_path,
            PathBuf::from("/etc/logcentral/ca.crt")
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(from_vars(&[("LOGCENTRAL_API_PORT", "not-a-port")]).is_err());

        let config = from_vars(&[("LOGCENTRAL_SYNC_EVERY", "0")]).unwrap();
        assert!(config.client_config().is_err());

        let config = from_vars(&[("LOGCENTRAL_ENDPOINT", "nowhere")]).unwrap();
        assert!(config.grpc_config().is_err());
    }
}
