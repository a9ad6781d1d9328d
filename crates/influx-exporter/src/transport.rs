// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HTTP transport seam.
//!
//! The exporter only needs "GET a URL" and "POST a prepared write
//! request"; TLS, connection pooling and timeouts live behind this trait.
//! Production uses [`ReqwestTransport`], tests substitute a recording
//! mock.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExportError;
use crate::request::WriteRequest;

/// Minimal view of an HTTP response: status code, headers and body.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names lowercased at construction time.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// True for the 200..=300 range the connection test accepts.
    pub fn is_success(&self) -> bool {
        (200..=300).contains(&self.status)
    }
}

/// Transport collaborator consumed by the exporter.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Plain GET, used by the version probe.
    async fn get(&self, url: &str) -> Result<HttpResponse, ExportError>;

    /// POST a prepared line-protocol write request.
    async fn send_write(&self, request: &WriteRequest) -> Result<HttpResponse, ExportError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honoring the configured read timeout.
    pub fn new(read_timeout: Duration) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(read_timeout)
            .build()
            .map_err(|e| ExportError::Io(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, ExportError> {
        let response = self.client.get(url).send().await?;
        into_response(response).await
    }

    async fn send_write(&self, request: &WriteRequest) -> Result<HttpResponse, ExportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.send().await?;
        into_response(response).await
    }
}

async fn into_response(response: reqwest::Response) -> Result<HttpResponse, ExportError> {
    let status = response.status().as_u16();
    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
        }
    }
    let body = response.text().await?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-influxdb-version".to_string(), "1.8.3".to_string());
        let response = HttpResponse {
            status: 200,
            headers,
            body: String::new(),
        };
        assert_eq!(response.header("X-Influxdb-Version"), Some("1.8.3"));
        assert_eq!(response.header("x-influxdb-version"), Some("1.8.3"));
        assert!(response.header("content-type").is_none());
    }

    #[test]
    fn test_success_range_is_inclusive() {
        let ok = HttpResponse {
            status: 300,
            ..Default::default()
        };
        assert!(ok.is_success());
        let no = HttpResponse {
            status: 301,
            ..Default::default()
        };
        assert!(!no.is_success());
        let err = HttpResponse {
            status: 404,
            ..Default::default()
        };
        assert!(!err.is_success());
    }
}
