//! Command-line arguments

use crate::config::Config;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand};
use logcentral_lib::transport::TlsConfig;
use logcentral_lib::GrpcConfig;
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:7400";
pub const DEFAULT_NAME: &str = "logtool";

/// LogCentral tool CLI
#[derive(Debug, Parser)]
#[command(name = "logtool")]
#[command(author, version, about = "Consumer CLI for the LogCentral log service", long_about = None)]
pub struct Cli {
    /// Central service URL (can also be set via LOGTOOL_ENDPOINT env var)
    #[arg(long, env = "LOGTOOL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Name to register the tool under
    #[arg(long, env = "LOGTOOL_NAME")]
    pub name: Option<String>,

    /// CA certificate enabling TLS
    #[arg(long, env = "LOGTOOL_CA_CERT")]
    pub ca_cert: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Stream records matching a filter until Ctrl-C
    Watch {
        /// Tags to receive, comma separated (`*` for every tag)
        #[arg(long, short, value_delimiter = ',', default_value = "*")]
        tags: Vec<String>,

        /// Producers to receive from, comma separated (all if omitted)
        #[arg(long, short, value_delimiter = ',')]
        components: Vec<String>,

        /// Name of the filter installed on the service
        #[arg(long, default_value = "watch")]
        filter_name: String,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the tags known to the service
    Tags,

    /// List the producers known to the service
    Components,
}

/// Connection settings after merging flags, environment and config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub name: String,
    pub ca_cert: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Cli {
    /// Flags win over the config file, which wins over defaults
    pub fn settings(&self, config: &Config) -> Settings {
        Settings {
            endpoint: self
                .endpoint
                .clone()
                .or_else(|| config.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            name: self
                .name
                .clone()
                .or_else(|| config.name.clone())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            ca_cert: self.ca_cert.clone().or_else(|| config.ca_cert.clone()),
            format: self
                .format
                .or(config.default_format)
                .unwrap_or_default(),
        }
    }
}

impl Settings {
    pub fn grpc_config(&self) -> Result<GrpcConfig> {
        let mut builder = GrpcConfig::builder().endpoint(self.endpoint.clone());
        if let Some(ca_cert_path) = &self.ca_cert {
            builder = builder.tls(TlsConfig {
                ca_cert_path: ca_cert_path.clone(),
                client_cert_path: None,
                client_key_path: None,
            });
        }
        builder.build()
    }
}
