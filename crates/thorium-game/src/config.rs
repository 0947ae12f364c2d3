//! Game configuration and state machine.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thorium_protocol::{GameStatus, MachineId};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// What happens to hosted games when their machine leaves the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineLossPolicy {
    /// Registered games on the lost machine become `Unavailable`, and
    /// polling clients get `NotFound` instead of a dead address.
    #[default]
    MarkUnavailable,

    /// Registered games keep their last known address.
    KeepStale,
}

impl fmt::Display for MachineLossPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkUnavailable => write!(f, "mark-unavailable"),
            Self::KeepStale => write!(f, "keep-stale"),
        }
    }
}

impl FromStr for MachineLossPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mark-unavailable" => Ok(Self::MarkUnavailable),
            "keep-stale" => Ok(Self::KeepStale),
            other => Err(format!(
                "unknown machine loss policy {other:?} (expected mark-unavailable or keep-stale)"
            )),
        }
    }
}

/// Settings for the game manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub loss_policy: MachineLossPolicy,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The lifecycle state of a game.
///
/// ```text
/// Pending ──register_server──→ Registered ──host lost──→ Unavailable
/// ```
///
/// - **Pending**: Created, waiting for a machine to claim it. Polling
///   clients are told to come back later.
/// - **Registered**: A machine hosts it. Holds the address clients connect
///   to. Reached exactly once.
/// - **Unavailable**: The host left the fleet. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Pending,
    Registered {
        host: MachineId,
        address: IpAddr,
        port: u16,
    },
    Unavailable,
}

impl GameState {
    /// The wire status for this state.
    pub fn status(&self) -> GameStatus {
        match self {
            Self::Pending => GameStatus::Pending,
            Self::Registered { .. } => GameStatus::Registered,
            Self::Unavailable => GameStatus::Unavailable,
        }
    }

    /// The hosting machine, once registered.
    pub fn host(&self) -> Option<MachineId> {
        match self {
            Self::Registered { host, .. } => Some(*host),
            _ => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(&self, target: GameStatus) -> bool {
        matches!(
            (self.status(), target),
            (GameStatus::Pending, GameStatus::Registered)
                | (GameStatus::Registered, GameStatus::Unavailable)
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered { host, address, port } => {
                write!(f, "Registered({host} at {address}:{port})")
            }
            other => write!(f, "{}", other.status()),
        }
    }
}
