// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the exporter.

use thiserror::Error;

/// Errors raised by the exporter pipeline.
///
/// Failures inside a queued batch are logged and swallowed by the worker;
/// only the synchronous connection-test path surfaces them to the caller.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Transport or I/O failure: connection refused, malformed URL,
    /// interrupted request. All transport-level problems normalize here.
    #[error("i/o failure: {0}")]
    Io(String),

    /// The server advertised a major version this exporter does not speak.
    #[error("unsupported or unknown InfluxDB version '{0}'")]
    UnsupportedVersion(String),

    /// A send was attempted before any version probe succeeded.
    #[error("InfluxDB version not detected yet")]
    VersionUndetected,

    /// Non-2xx response on the connection-test path.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ExportError {
    fn from(e: reqwest::Error) -> Self {
        ExportError::Io(e.to_string())
    }
}
