//! Fleet configuration and load samples.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FleetConfig
// ---------------------------------------------------------------------------

/// Liveness settings for the machine registry.
///
/// A machine is Active while its last heartbeat (or its registration, if it
/// has never sent one) is younger than [`liveness_window`](Self::liveness_window):
///
/// ```text
/// registered ──hb──hb──hb──────────────────────────┤ expired
///                       │◀── interval × missed ──▶│
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// How often machines are expected to send a heartbeat.
    pub heartbeat_interval: Duration,

    /// Consecutive heartbeats a machine may miss before it counts as lost.
    pub missed_heartbeats: u32,

    /// How often the master sweeps lost machines out of the registry.
    pub sweep_interval: Duration,
}

impl FleetConfig {
    /// Age after which a silent machine stops being Active.
    pub fn liveness_window(&self) -> Duration {
        self.heartbeat_interval * self.missed_heartbeats.max(1)
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(10),
            missed_heartbeats: 3,
            sweep_interval: Duration::from_secs(5),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadSample
// ---------------------------------------------------------------------------

/// Load reported by a machine in its latest heartbeat.
///
/// All zero until the first heartbeat arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadSample {
    /// CPU utilization, as the machine reports it.
    pub cpu: f32,

    /// Network utilization, as the machine reports it.
    pub network: f32,

    /// How many more players the machine can take.
    pub player_capacity: u32,
}
