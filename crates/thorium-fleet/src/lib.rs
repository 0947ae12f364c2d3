//! The machine fleet for the Thorium master service.
//!
//! Worker machines register with the master, prove they're alive with
//! periodic heartbeats, and leave either explicitly or by going quiet for
//! longer than the liveness window.
//!
//! # Key types
//!
//! - [`MachineRegistry`]: registration, heartbeats, liveness, expiry
//! - [`MachineInfo`]: a snapshot of one machine
//! - [`LoadSample`]: the load a machine last reported
//! - [`FleetConfig`]: heartbeat interval and liveness window

mod config;
mod error;
mod registry;

pub use config::{FleetConfig, LoadSample};
pub use error::FleetError;
pub use registry::{MachineInfo, MachineRegistry};
