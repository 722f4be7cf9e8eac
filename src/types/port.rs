//! Port types and port-specification parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! [`parse_ports`] turns a user-supplied specification into an ordered list
//! of ports, dropping anything malformed instead of failing.

use super::parsed::Parsed;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Parse a single trimmed token as a port.
    pub fn parse_token(token: &str) -> Result<Self, PortError> {
        let token = token.trim();
        let value: u32 = token
            .parse()
            .map_err(|_| PortError::InvalidFormat(token.to_string()))?;
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value.into()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Why a port token was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port range: start ({0}) > end ({1})")]
    ReversedRange(u16, u16),
    #[error("port range must have exactly two bounds")]
    MalformedRange,
}

/// Ports probed when no specification is given.
pub const DEFAULT_PORTS: [u16; 19] = [
    21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5900, 8080,
];

/// The default port list as validated ports.
pub fn default_ports() -> Vec<Port> {
    DEFAULT_PORTS.iter().copied().filter_map(Port::new).collect()
}

/// Parse a port specification.
///
/// Supported forms, checked in this order:
/// - empty: the [`DEFAULT_PORTS`] list
/// - `a-b`: inclusive range; a bad bound or `a > b` yields nothing
/// - `a,b,c`: list in input order, duplicates kept, bad tokens dropped
/// - `a`: a single port
///
/// Dispatch is on the first matching separator, so `22,80-90` is treated as
/// a (malformed) range.
pub fn parse_ports(spec: &str) -> Parsed<Port, PortError> {
    let spec = spec.trim();

    if spec.is_empty() {
        return Parsed::from_items(default_ports());
    }

    let mut parsed = Parsed::new();

    if spec.contains('-') {
        match parse_range(spec) {
            Ok(ports) => parsed.items = ports,
            Err(e) => parsed.skip(spec, e),
        }
    } else if spec.contains(',') {
        for token in spec.split(',') {
            match Port::parse_token(token) {
                Ok(port) => parsed.items.push(port),
                Err(e) => parsed.skip(token.trim(), e),
            }
        }
    } else {
        match Port::parse_token(spec) {
            Ok(port) => parsed.items.push(port),
            Err(e) => parsed.skip(spec, e),
        }
    }

    parsed
}

fn parse_range(spec: &str) -> Result<Vec<Port>, PortError> {
    let bounds: Vec<&str> = spec.split('-').collect();
    if bounds.len() != 2 {
        return Err(PortError::MalformedRange);
    }

    let start = Port::parse_token(bounds[0])?;
    let end = Port::parse_token(bounds[1])?;
    if start > end {
        return Err(PortError::ReversedRange(start.0, end.0));
    }

    Ok((start.0..=end.0).map(Port).collect())
}
