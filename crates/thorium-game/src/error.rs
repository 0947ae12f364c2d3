//! Error types for the game layer.

use thorium_protocol::{ErrorKind, GameId, MachineId};

/// Errors that can occur during game lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The game was never created.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The game's host was lost. Clients see this as not found.
    #[error("game {0} is no longer available")]
    Unavailable(GameId),

    /// A new game needs a map name.
    #[error("map name is empty")]
    MissingMap,

    /// A game server needs a listening port.
    #[error("game server port must be nonzero")]
    MissingPort,

    /// The machine claiming the game isn't an Active fleet member.
    #[error("machine {0} is not active")]
    MachineNotActive(MachineId),

    /// Another machine already claimed the game.
    #[error("game {0} already has a server")]
    AlreadyRegistered(GameId),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::Unavailable(_) => ErrorKind::NotFound,
            Self::MissingMap | Self::MissingPort | Self::MachineNotActive(_) => {
                ErrorKind::InvalidArgument
            }
            Self::AlreadyRegistered(_) => ErrorKind::Conflict,
        }
    }
}
