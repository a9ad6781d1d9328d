// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exporter facade: unbounded snapshot queue, single worker task and the
//! synchronous connection-test path.
//!
//! Producers enqueue snapshots without ever blocking; one worker drains
//! the queue serially and drives encode -> resolve version -> build
//! request -> send for each batch. Batches reach the server in enqueue
//! order and a failed batch never poisons the ones behind it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::encode::encode_snapshot;
use crate::error::ExportError;
use crate::request::build_write_request;
use crate::settings::ConnectionSettings;
use crate::table::Snapshot;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::version::resolve_version;

/// Asynchronous InfluxDB exporter.
///
/// Lifecycle: `Created -> Running -> Stopped`, one-directional.
/// [`initialize`](Self::initialize) starts the worker,
/// [`shutdown`](Self::shutdown) stops it for good; the worker is never
/// restarted.
pub struct InfluxExporter {
    settings: Arc<ConnectionSettings>,
    transport: Arc<dyn HttpTransport>,
    sender: mpsc::UnboundedSender<Snapshot>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Snapshot>>>,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    worker: Mutex<Option<JoinHandle<()>>>,
    last_call: Mutex<Option<DateTime<Utc>>>,
}

impl InfluxExporter {
    /// Create an exporter over an explicit transport.
    pub fn new(settings: ConnectionSettings, transport: Arc<dyn HttpTransport>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            settings: Arc::new(settings),
            transport,
            sender,
            receiver: Mutex::new(Some(receiver)),
            running: Arc::new(AtomicBool::new(true)),
            stop: Arc::new(Notify::new()),
            worker: Mutex::new(None),
            last_call: Mutex::new(None),
        }
    }

    /// Create an exporter backed by a [`ReqwestTransport`] configured with
    /// the settings' read timeout.
    pub fn from_settings(settings: ConnectionSettings) -> Result<Self, ExportError> {
        let transport = Arc::new(ReqwestTransport::new(settings.read_timeout())?);
        Ok(Self::new(settings, transport))
    }

    /// The connection settings this exporter sends with.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Timestamp of the most recently accepted snapshot.
    pub fn last_call(&self) -> Option<DateTime<Utc>> {
        *self.last_call.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start the worker task. A second call is a no-op.
    pub fn initialize(&self) {
        let Some(receiver) = self.receiver.lock().unwrap_or_else(|e| e.into_inner()).take()
        else {
            warn!("influx exporter already initialized");
            return;
        };
        debug!("initialize influx exporter");
        let settings = Arc::clone(&self.settings);
        let transport = Arc::clone(&self.transport);
        let running = Arc::clone(&self.running);
        let stop = Arc::clone(&self.stop);
        let handle = tokio::spawn(run_worker(settings, transport, receiver, running, stop));
        *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Enqueue a snapshot for export. Never blocks, no backpressure: the
    /// queue is unbounded by design. Snapshots without tables are dropped
    /// here and never reach the queue.
    pub fn add_export(&self, snapshot: Snapshot) {
        if snapshot.tables().is_empty() {
            debug!("no exporting tables, skip export");
            return;
        }
        debug!("add export for {} table(s)", snapshot.tables().len());
        *self.last_call.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.timestamp());
        let _ = self.sender.send(snapshot);
    }

    /// Stop the worker and wait for it to exit. An in-flight send is
    /// allowed to complete, but no further batch is started even when the
    /// queue is non-empty.
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop.notify_one();
        let handle = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Validate candidate settings against a live server, independent of
    /// the queue.
    ///
    /// Probes the version, sends an empty write and classifies the
    /// response: 2xx yields a success message containing the detected
    /// version; a JSON error body surfaces its `error` (or `message`)
    /// field verbatim; anything else surfaces the raw status code.
    pub async fn test_connection(
        transport: &dyn HttpTransport,
        settings: &ConnectionSettings,
    ) -> Result<String, ExportError> {
        let version = resolve_version(transport, settings).await?;
        settings.set_version(&version);
        let request = build_write_request(settings, "")?;
        let response = transport.send_write(&request).await?;
        if response.is_success() {
            return Ok(format!(
                "successfully connected to InfluxDB version {version}"
            ));
        }
        error!("connection test failed with status {}", response.status);
        let content_type = response.header("content-type").unwrap_or("");
        let message = if content_type.contains("application/json") {
            json_error_message(&response.body, response.status)
        } else {
            response.status.to_string()
        };
        Err(ExportError::Server {
            status: response.status,
            message,
        })
    }
}

/// Extract the `error` or `message` field from a JSON error body.
fn json_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .map(|field| match field.as_str() {
                    Some(s) => s.to_string(),
                    None => field.to_string(),
                })
        })
        .unwrap_or_else(|| format!("unknown json error with {status}"))
}

/// Worker loop: drain the queue serially until shutdown.
async fn run_worker(
    settings: Arc<ConnectionSettings>,
    transport: Arc<dyn HttpTransport>,
    mut receiver: mpsc::UnboundedReceiver<Snapshot>,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
) {
    debug!("influx export worker started");
    while running.load(Ordering::SeqCst) {
        let snapshot = tokio::select! {
            _ = stop.notified() => break,
            received = receiver.recv() => match received {
                Some(snapshot) => snapshot,
                None => break,
            },
        };
        if !running.load(Ordering::SeqCst) {
            break;
        }
        process_snapshot(&settings, transport.as_ref(), snapshot).await;
    }
    debug!("influx export worker stopped");
}

/// Handle one queued snapshot. Every failure is logged and swallowed so
/// the next batch is unaffected.
async fn process_snapshot(
    settings: &ConnectionSettings,
    transport: &dyn HttpTransport,
    snapshot: Snapshot,
) {
    if snapshot.tables().is_empty() {
        debug!("no exporting tables, skip export");
        return;
    }
    // Fallback timestamp for rows without a timestamp cell, captured once
    // per snapshot.
    let fallback_secs = Utc::now().timestamp();
    let body = encode_snapshot(&snapshot, fallback_secs);
    if body.is_empty() {
        warn!("empty table(s), skip export");
        return;
    }
    if let Err(e) = send_batch(settings, transport, body).await {
        error!("export batch dropped: {e}");
    }
}

/// Send one encoded batch, resolving the server version first if it has
/// not been detected yet.
async fn send_batch(
    settings: &ConnectionSettings,
    transport: &dyn HttpTransport,
    body: String,
) -> Result<(), ExportError> {
    if settings.version().is_none() {
        // Probe failure is not terminal here: the version stays absent so
        // the next batch retries detection.
        match resolve_version(transport, settings).await {
            Ok(version) => settings.set_version(version),
            Err(e) => error!("version probe failed: {e}"),
        }
    }
    let request = build_write_request(settings, body)?;
    let response = transport.send_write(&request).await?;
    if response.status >= 300 {
        error!(
            "InfluxDB returned error code {}, data={}",
            response.status, request.body
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_message_prefers_error_field() {
        let body = r#"{"error":"database not found: test"}"#;
        assert_eq!(json_error_message(body, 404), "database not found: test");
    }

    #[test]
    fn test_json_error_message_falls_back_to_message_field() {
        let body = r#"{"message":"unauthorized"}"#;
        assert_eq!(json_error_message(body, 401), "unauthorized");
    }

    #[test]
    fn test_json_error_message_unparsable_body() {
        assert_eq!(
            json_error_message("not json", 500),
            "unknown json error with 500"
        );
    }

    #[test]
    fn test_json_error_message_non_string_field() {
        let body = r#"{"error":{"code":7}}"#;
        assert_eq!(json_error_message(body, 400), r#"{"code":7}"#);
    }
}
