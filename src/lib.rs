//! # portsweep - concurrent TCP reachability sweeps
//!
//! Given target specifications (hosts, ranges, CIDR blocks) and a port
//! specification, portsweep attempts a TCP connect to every (address, port)
//! pair, labels open ports by well-known service, and merges the results
//! into one record per host.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{ScanConfig, ScanEngine};
//! use portsweep::services::ServiceTable;
//! use portsweep::types::{parse_ports, parse_targets, MAX_HOSTS_PER_TARGET};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let targets = parse_targets(["192.168.1.0/28"], MAX_HOSTS_PER_TARGET);
//!     let ports = parse_ports("22,80,443");
//!
//!     let engine = ScanEngine::new(
//!         ScanConfig::new(64, Duration::from_secs(2)),
//!         Arc::new(ServiceTable::common()),
//!     );
//!     let report = engine
//!         .run(targets.items, ports.items, CancellationToken::new())
//!         .await;
//!
//!     print!("{}", portsweep::output::render_table(&report));
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - port and target parsing, address arithmetic
//! - [`services`] - port to service-label lookup
//! - [`scanner`] - the worker-pool scan engine and its probe seams
//! - [`aggregate`] - per-host merging of probe results
//! - [`output`] - table, JSON and CSV reporting
//! - [`config`] - persisted settings
//! - [`error`] - error types

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use aggregate::{Aggregator, HostRecord, ScanReport};
pub use error::{CliError, ScanError};
pub use scanner::{PartialResult, ScanConfig, ScanEngine};
pub use services::ServiceTable;
pub use types::{Port, ScanAddress};
