//! Core input types: ports, targets, and the lenient parse report they share.
//!
//! Parsing here degrades instead of failing: malformed entries are reported
//! alongside whatever parsed cleanly.

mod parsed;
mod port;
mod target;

pub use parsed::{Parsed, Skipped};
pub use port::{default_ports, parse_ports, Port, PortError, DEFAULT_PORTS};
pub use target::{
    expand_cidr, expand_range, next_address, parse_target, parse_targets, ScanAddress,
    TargetError, MAX_HOSTS_PER_TARGET,
};
