//! GVO Core - Attribute synchronization engine for Graphics-to-Video-Out.
//!
//! This crate contains the backend logic for an SDI (Graphics-to-Video-Out)
//! control panel with zero UI dependencies. It keeps a local cache of device
//! attributes consistent with the remote device, negotiates which output
//! formats are currently legal, reconciles device-originated change events
//! without feedback loops, and animates the four-slot status banner on a
//! fixed tick. A GUI or CLI front end implements the surface traits defined
//! here and drives the cooperative loop.

pub mod banner;
pub mod catalog;
pub mod channel;
pub mod config;
pub mod controller;
pub mod detect;
pub mod errors;
pub mod logging;
pub mod models;
pub mod panel;
pub mod scheduler;
pub mod surface;
pub mod validity;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
