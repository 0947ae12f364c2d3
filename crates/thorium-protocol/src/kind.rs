//! The closed error taxonomy shared by every Thorium component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What went wrong, independent of which registry reported it or which
/// transport carries it.
///
/// Every core error type exposes a `kind()` method returning one of these.
/// The HTTP layer maps kinds to status codes; the client library maps
/// status codes and error bodies back to kinds. Nothing is matched by
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The referenced account, character, or game does not exist.
    NotFound,
    /// A unique name (username, character name) is already taken.
    AlreadyInUse,
    /// The account already has a live session.
    AlreadyActive,
    /// The password does not match the account.
    InvalidCredential,
    /// The session token is unknown or was invalidated.
    InvalidSession,
    /// The machine token is unknown, expired, or belongs to another machine.
    InvalidToken,
    /// A required field is missing or malformed.
    InvalidArgument,
    /// The operation lost a race against a state change, e.g. a second
    /// server registration for an already-hosted game.
    Conflict,
    /// An unclassified failure behind the service (store backend, I/O).
    Internal,
}

impl ErrorKind {
    /// Returns the stable camelCase name used in error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "notFound",
            Self::AlreadyInUse => "alreadyInUse",
            Self::AlreadyActive => "alreadyActive",
            Self::InvalidCredential => "invalidCredential",
            Self::InvalidSession => "invalidSession",
            Self::InvalidToken => "invalidToken",
            Self::InvalidArgument => "invalidArgument",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_as_str_matches_serde_name() {
        let kinds = [
            ErrorKind::NotFound,
            ErrorKind::AlreadyInUse,
            ErrorKind::AlreadyActive,
            ErrorKind::InvalidCredential,
            ErrorKind::InvalidSession,
            ErrorKind::InvalidToken,
            ErrorKind::InvalidArgument,
            ErrorKind::Conflict,
            ErrorKind::Internal,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::InvalidCredential.to_string(), "invalidCredential");
    }
}
