// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Write-request construction: dialect dispatch plus URL and auth headers.

use crate::error::ExportError;
use crate::settings::ConnectionSettings;
use crate::version::ApiVersion;

/// A prepared POST request: everything the transport needs to send one
/// line-protocol batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Build the write request for one encoded batch.
///
/// Fails when no version has been detected yet or when the detected major
/// version is neither 1 nor 2. Both failures are terminal for this single
/// batch only; the batch is dropped, never requeued.
pub fn build_write_request(
    settings: &ConnectionSettings,
    body: impl Into<String>,
) -> Result<WriteRequest, ExportError> {
    let major = settings.major_version().ok_or(ExportError::VersionUndetected)?;
    let api = ApiVersion::from_major(major).ok_or_else(|| {
        ExportError::UnsupportedVersion(settings.version().unwrap_or_default().to_string())
    })?;
    Ok(WriteRequest {
        url: api.write_url(settings),
        headers: api.auth_headers(settings),
        body: body.into(),
    })
}
