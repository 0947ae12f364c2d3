//! Error types for the client.

use thorium_protocol::{ErrorKind, GameId, ProtocolError};

/// Errors returned by [`MasterClient`](crate::MasterClient) calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got an HTTP response (connect, timeout, ...).
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The master answered with a non-success status.
    ///
    /// `kind` is `None` when the body wasn't an error body, e.g. when the
    /// master's JSON extractor rejected the request.
    #[error("master answered {status}: {message}")]
    Api {
        status: u16,
        kind: Option<ErrorKind>,
        message: String,
    },

    /// The game was still pending after the whole polling budget.
    #[error("game {game_id} still pending after {attempts} polls")]
    NotReady { game_id: GameId, attempts: u32 },
}

impl ClientError {
    /// The master's error kind, if the master reported one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api { kind, .. } => *kind,
            _ => None,
        }
    }

    /// The HTTP status, if the master answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
