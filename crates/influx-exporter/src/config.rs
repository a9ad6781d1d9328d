// SPDX-License-Identifier: Apache-2.0 OR MIT

//! YAML configuration for the exporter.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ExportError;
use crate::settings::{ConnectionSettings, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS};

/// Exporter connection configuration.
///
/// For InfluxDB v2 servers `user` holds the organization name and
/// `password` the API token.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// InfluxDB host name or address.
    #[serde(default = "default_host")]
    pub host: String,
    /// InfluxDB port. Default 8086.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional user (v1) or organization (v2).
    pub user: Option<String>,
    /// Optional password (v1) or API token (v2).
    pub password: Option<String>,
    /// Database (v1) or bucket (v2) to write into.
    #[serde(default = "default_database")]
    pub database: String,
    /// Use https instead of http.
    #[serde(default)]
    pub ssl: bool,
    /// Read timeout in milliseconds. Default 5000.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database() -> String {
    "solarreader".to_string()
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: None,
            password: None,
            database: default_database(),
            ssl: false,
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl ExporterConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ExportError> {
        serde_yaml::from_str(yaml).map_err(|e| ExportError::Config(e.to_string()))
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ExportError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ExportError::Config(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Build fresh connection settings (with an empty version cache).
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(
            self.host.clone(),
            self.port,
            self.user.clone(),
            self.password.clone(),
            self.database.clone(),
            self.ssl,
            Duration::from_millis(self.read_timeout_ms),
        )
    }
}
