//! Configuration management for portsweep.
//!
//! Provides XDG-compliant settings storage. Command-line flags take
//! precedence over anything loaded here.

mod settings;

pub use settings::{AppSettings, Paths};
