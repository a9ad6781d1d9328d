// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous InfluxDB exporter for tabular measurement snapshots.
//!
//! Converts table snapshots into InfluxDB Line Protocol and delivers them
//! over HTTP, speaking both the v1.x and v2.x API dialects. The dialect is
//! detected at runtime from the server's version header and cached.
//!
//! ```text
//! producer --> add_export --> queue --> worker --> encoder
//!                                          --> version resolver/strategy
//!                                          --> request builder --> transport
//! ```
//!
//! Producers never block: the queue is unbounded and a single worker task
//! drains it serially, so batches arrive at the server in enqueue order
//! and at most one send is in flight at any time.

pub mod config;
pub mod encode;
pub mod error;
pub mod exporter;
pub mod request;
pub mod settings;
pub mod table;
pub mod transport;
pub mod version;

pub use config::ExporterConfig;
pub use error::ExportError;
pub use exporter::InfluxExporter;
pub use request::WriteRequest;
pub use settings::ConnectionSettings;
pub use table::{Cell, Column, ColumnType, Snapshot, TableRow, TableSnapshot};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use version::ApiVersion;
