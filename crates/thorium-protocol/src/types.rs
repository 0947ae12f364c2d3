//! Core protocol types for the Thorium wire format.
//!
//! Every type in this module travels on the wire as a JSON body. Field
//! names are camelCase on the wire (`sessionKey`, `remoteAddress`) to match
//! what existing game clients already send.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ErrorKind;

/// Player cap applied when a new-game request doesn't name one.
pub const DEFAULT_MAX_PLAYERS: u32 = 16;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Declares a `u64` id newtype.
///
/// Ids are allocated from 1 upward; the value `0` is reserved and never
/// handed out, so a zero id on the wire always means "unset".
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns `true` for the reserved "unset" value `0`.
            pub fn is_unset(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a player account.
    AccountId,
    "A"
);

id_type!(
    /// Identifies a character owned by an account.
    CharacterId,
    "C"
);

id_type!(
    /// Identifies a machine in the fleet.
    MachineId,
    "M"
);

id_type!(
    /// Identifies one game instance.
    GameId,
    "G"
);

/// A character class identifier. `0` is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

/// A position in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// The world origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

// ---------------------------------------------------------------------------
// Accounts and sessions
// ---------------------------------------------------------------------------

/// Body of `POST /clients/register` and `POST /clients/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Passwords never end up in logs, even at trace level.
impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response to a successful register or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_key: String,
    pub character_ids: Vec<CharacterId>,
}

/// Body of `POST /clients/disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disconnect {
    #[serde(default)]
    pub session_key: String,
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Body of `POST /characters/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacter {
    #[serde(default)]
    pub session_key: String,
    #[serde(default)]
    pub name: String,
    pub class_id: ClassId,
}

/// Response to a successful character creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterCreated {
    pub character_id: CharacterId,
}

/// Public profile of a character, returned by `GET /characters/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub character_id: CharacterId,
    pub name: String,
    pub class_id: ClassId,
    pub position: Vector3,
}

/// Body of `POST /characters/{id}/position`, sent by a game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePosition {
    #[serde(default)]
    pub machine_token: String,
    pub position: Vector3,
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

/// Body of `POST /machines/register`.
///
/// Only the port is accepted: the machine's address comes from the
/// connection it registers over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMachine {
    /// Missing on the wire decodes to `0`, which the fleet rejects.
    #[serde(default)]
    pub port: u16,
}

/// Response to a successful machine registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRegistered {
    pub machine_id: MachineId,
    pub machine_token: String,
}

/// Body of `POST /machines/status`: a heartbeat with the current load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    #[serde(default)]
    pub machine_token: String,
    #[serde(default)]
    pub usage_cpu: f32,
    #[serde(default)]
    pub usage_network: f32,
    #[serde(default)]
    pub player_capacity: u32,
}

/// Body of `POST /machines/{id}/disconnect` and `DELETE /machines/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnregisterMachine {
    #[serde(default)]
    pub machine_token: String,
}

/// One row of `GET /machines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineEntry {
    pub machine_id: MachineId,
    pub address: String,
    pub port: u16,
    pub usage_cpu: f32,
    pub usage_network: f32,
    pub player_capacity: u32,
    /// Whole seconds since the last heartbeat (or registration).
    pub last_seen_secs: u64,
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

fn default_max_players() -> u32 {
    DEFAULT_MAX_PLAYERS
}

/// Body of `POST /games/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    /// Missing on the wire decodes to `""`, which the game manager rejects.
    #[serde(default)]
    pub map: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub minimum_level: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
}

/// Response to a successful game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreated {
    pub game_id: GameId,
}

/// Body of `POST /games/{id}/register_server`, sent by the hosting machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterGameServer {
    pub machine_id: MachineId,
    #[serde(default)]
    pub machine_token: String,
    #[serde(default)]
    pub port: u16,
}

/// Where a client should connect to join a hosted game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub remote_address: String,
    pub port: u16,
}

/// The wire view of a game's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// Waiting for a machine to host it.
    Pending,
    /// Hosted; `server_info` answers with an address.
    Registered,
    /// The hosting machine was lost.
    Unavailable,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Registered => write!(f, "Registered"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// One row of `GET /games`, also the body of `GET /games/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEntry {
    pub game_id: GameId,
    pub map: String,
    pub mode: String,
    pub minimum_level: u32,
    pub max_players: u32,
    pub status: GameStatus,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}
