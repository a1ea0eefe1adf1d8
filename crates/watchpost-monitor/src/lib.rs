//! Device reachability monitoring.
//!
//! A [`DeviceMonitor`] polls every inventoried device with an IP address
//! and broadcasts status deltas over a tokio broadcast channel. The poll
//! loop is demand-driven: it starts with the first subscriber and exits
//! once the last one disconnects.

pub mod monitor;
pub mod pinger;

#[cfg(test)]
mod tests;

pub use monitor::DeviceMonitor;
pub use pinger::{Pinger, SystemPinger};
