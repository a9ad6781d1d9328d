// SPDX-License-Identifier: Apache-2.0 OR MIT

//! InfluxDB API dialect selection and server version detection.
//!
//! The set of supported major versions is fixed and small, so the
//! version-specific behavior is a closed enum rather than an open trait:
//! v1 and v2 differ only in the write-URL shape and the authorization
//! header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;

use crate::error::ExportError;
use crate::settings::ConnectionSettings;
use crate::transport::HttpTransport;

/// Response header carrying the server's advertised version.
pub const VERSION_HEADER: &str = "X-Influxdb-Version";

/// Placeholder cached when the probe succeeds but the header is absent.
/// It parses to major version 1, selecting the v1 dialect.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Wire dialect of one InfluxDB major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    /// Dialect for a detected major version; `None` when unsupported.
    pub fn from_major(major: u32) -> Option<Self> {
        match major {
            1 => Some(ApiVersion::V1),
            2 => Some(ApiVersion::V2),
            _ => None,
        }
    }

    /// Write endpoint URL for these settings, always second precision.
    ///
    /// In the v2 dialect the settings' `user` doubles as the organization
    /// and `database` as the bucket.
    pub fn write_url(&self, settings: &ConnectionSettings) -> String {
        match self {
            ApiVersion::V1 => format!(
                "{}://{}:{}/write?db={}&precision=s",
                settings.scheme(),
                settings.host(),
                settings.port(),
                settings.database(),
            ),
            ApiVersion::V2 => format!(
                "{}://{}:{}/api/v2/write?bucket={}&precision=s&org={}",
                settings.scheme(),
                settings.host(),
                settings.port(),
                settings.database(),
                settings.user().unwrap_or(""),
            ),
        }
    }

    /// Authorization headers for these settings.
    ///
    /// Both dialects send auth only when user and password are both set:
    /// v1 uses Basic auth, v2 sends the password as an API token.
    pub fn auth_headers(&self, settings: &ConnectionSettings) -> Vec<(String, String)> {
        let (Some(user), Some(password)) = (settings.user(), settings.password()) else {
            return Vec::new();
        };
        let value = match self {
            ApiVersion::V1 => {
                let credentials = BASE64.encode(format!("{user}:{password}"));
                format!("Basic {credentials}")
            }
            ApiVersion::V2 => format!("Token {password}"),
        };
        vec![("Authorization".to_string(), value)]
    }
}

/// Probe the server root for its advertised version.
///
/// Best effort, single attempt: a transport failure propagates to the
/// caller, a missing header yields [`UNKNOWN_VERSION`]. The caller is
/// responsible for caching the result on the settings.
pub async fn resolve_version<T: HttpTransport + ?Sized>(
    transport: &T,
    settings: &ConnectionSettings,
) -> Result<String, ExportError> {
    let url = settings.connection_url();
    debug!("probing InfluxDB version at {url}");
    let response = transport.get(&url).await?;
    let version = response
        .header(VERSION_HEADER)
        .unwrap_or(UNKNOWN_VERSION)
        .to_string();
    debug!("detected InfluxDB version '{version}'");
    Ok(version)
}
