// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection settings with a lazily detected server version.
//!
//! Settings are immutable once built, except for the cached `version`
//! string, which is populated at most once after the first successful
//! probe. A settings change upstream rebuilds the whole instance, which
//! implicitly resets the cache.

use std::sync::OnceLock;
use std::time::Duration;

/// Default InfluxDB port.
pub const DEFAULT_PORT: u16 = 8086;

/// Default read timeout in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;

/// Connection parameters for one InfluxDB server.
///
/// In the v2 dialect the `user` field carries the organization name and
/// the `password` field carries the API token.
#[derive(Debug)]
pub struct ConnectionSettings {
    host: String,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    database: String,
    ssl: bool,
    read_timeout: Duration,
    version: OnceLock<String>,
}

impl ConnectionSettings {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: Option<String>,
        password: Option<String>,
        database: impl Into<String>,
        ssl: bool,
        read_timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user,
            password,
            database: database.into(),
            ssl,
            read_timeout,
            version: OnceLock::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn ssl(&self) -> bool {
        self.ssl
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// URL scheme derived from the SSL flag.
    pub fn scheme(&self) -> &'static str {
        if self.ssl { "https" } else { "http" }
    }

    /// Server root URL, used by the version probe.
    pub fn connection_url(&self) -> String {
        format!("{}://{}:{}/", self.scheme(), self.host, self.port)
    }

    /// The cached server version string, if a probe has succeeded.
    pub fn version(&self) -> Option<&str> {
        self.version.get().map(|v| v.as_str())
    }

    /// Cache the detected server version. Only the first call per settings
    /// instance takes effect; later calls are silently ignored.
    pub fn set_version(&self, version: impl Into<String>) {
        let _ = self.version.set(version.into());
    }

    /// Major version derived from the cached version string.
    ///
    /// Strips everything but digits and dots, splits on `.` and parses the
    /// first segment. An unparsable segment (e.g. the `"unknown"`
    /// placeholder) yields `1`, making v1 the default dialect when
    /// detection is inconclusive. Returns `None` while no version string
    /// has been cached at all.
    pub fn major_version(&self) -> Option<u32> {
        let version = self.version()?;
        let cleaned: String = version.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
        let first = cleaned.split('.').next().unwrap_or("");
        Some(first.parse().unwrap_or(1))
    }
}
