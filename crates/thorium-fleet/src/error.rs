//! Error types for the fleet layer.

use thorium_protocol::ErrorKind;

/// Errors that can occur during machine registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FleetError {
    /// Registration without a listening port.
    #[error("machine port must be nonzero")]
    MissingPort,

    /// The machine token is unknown, or belongs to a different machine.
    #[error("invalid machine token")]
    InvalidToken,
}

impl FleetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPort => ErrorKind::InvalidArgument,
            Self::InvalidToken => ErrorKind::InvalidToken,
        }
    }
}
