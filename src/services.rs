//! Service classification based on well-known port numbers.
//!
//! The table is built once at startup and shared read-only by every probe
//! task. It answers by convention only; nothing is verified on the wire.

use crate::types::Port;
use std::collections::HashMap;

/// Label for ports with no table entry.
pub const UNKNOWN_SERVICE: &str = "Unknown";

const COMMON_SERVICES: [(u16, &str); 19] = [
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (135, "RPC"),
    (139, "NetBIOS"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1723, "PPTP"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5900, "VNC"),
    (8080, "HTTP-Alt"),
];

/// Immutable port-to-service mapping.
#[derive(Debug, Clone, Default)]
pub struct ServiceTable {
    entries: HashMap<u16, String>,
}

impl ServiceTable {
    /// An empty table; every port classifies as [`UNKNOWN_SERVICE`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table of commonly probed services.
    pub fn common() -> Self {
        Self {
            entries: COMMON_SERVICES
                .iter()
                .map(|&(port, name)| (port, name.to_string()))
                .collect(),
        }
    }

    /// Return a copy of this table with extra or replacement entries.
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        for (port, name) in overrides {
            self.entries.insert(port, name.into());
        }
        self
    }

    /// Look up the service label for a port.
    pub fn classify(&self, port: Port) -> &str {
        self.entries
            .get(&port.as_u16())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SERVICE)
    }

    /// Number of known entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
