//! Seams of the scan engine.
//!
//! [`Prober`] decides whether a port accepts connections and
//! [`ReverseResolver`] names an address. Both are traits so the engine can
//! be driven by fakes in tests.

use crate::error::ScanResult;
use crate::types::{Port, ScanAddress};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

/// One successful probe: a single open port on a single address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    /// Address as given to the engine (IP text or hostname).
    pub address: String,
    /// Reverse-resolved hostname, when one was found.
    pub hostname: Option<String>,
    /// The open port.
    pub port: Port,
    /// Service label from the classifier.
    pub service: String,
}

impl PartialResult {
    /// Create a partial result without a hostname.
    pub fn new(address: impl Into<String>, port: Port, service: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: None,
            port,
            service: service.into(),
        }
    }

    /// Set the hostname.
    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }
}

/// Checks whether a TCP port accepts connections.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `Ok(())` if `address:port` accepted a connection within
    /// `timeout`. Any error means "not open".
    async fn probe(&self, address: &ScanAddress, port: Port, timeout: Duration) -> ScanResult<()>;
}

/// Maps an IP address back to a hostname.
#[async_trait]
pub trait ReverseResolver: Send + Sync {
    /// Returns the first name found for `ip`, without a trailing dot.
    async fn reverse(&self, ip: IpAddr) -> Option<String>;
}

/// A resolver that never finds a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReverseLookup;

#[async_trait]
impl ReverseResolver for NoReverseLookup {
    async fn reverse(&self, _ip: IpAddr) -> Option<String> {
        None
    }
}
