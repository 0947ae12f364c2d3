//! Unified error type for the Thorium master service.

use axum::extract::rejection::JsonRejection;
use thorium_fleet::FleetError;
use thorium_game::GameError;
use thorium_protocol::{ErrorKind, ProtocolError};
use thorium_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ThoriumError {
    /// An account, session, or character error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A machine registry error (missing port, bad token).
    #[error(transparent)]
    Fleet(#[from] FleetError),

    /// A game lifecycle error (unknown game, double registration).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A request body was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Binding or serving the listener failed.
    #[error("server i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// A request body axum could not turn into the expected type: bad JSON,
/// wrong field types, or no JSON content type.
impl From<JsonRejection> for ThoriumError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Protocol(ProtocolError::InvalidMessage(rejection.body_text()))
    }
}

impl ThoriumError {
    /// Maps this error onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => e.kind(),
            Self::Fleet(e) => e.kind(),
            Self::Game(e) => e.kind(),
            Self::Protocol(_) => ErrorKind::InvalidArgument,
            Self::Io(_) => ErrorKind::Internal,
        }
    }
}
