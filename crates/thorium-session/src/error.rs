//! Error types for the session layer.

use thorium_protocol::{AccountId, CharacterId, ErrorKind};

/// Errors that can occur during account, session, and character operations.
///
/// Login failures are deliberately split three ways (`AccountNotFound`,
/// `InvalidCredential`, `AlreadyActive`) so callers can tell a typo from a
/// second device that's still logged in.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No account exists with this username.
    #[error("account {0:?} does not exist")]
    AccountNotFound(String),

    /// The username is already registered.
    #[error("username {0:?} is already in use")]
    UsernameInUse(String),

    /// The account already has a live session; disconnect it first.
    #[error("account {0} is already logged in")]
    AlreadyActive(AccountId),

    /// The password does not match.
    #[error("invalid credential")]
    InvalidCredential,

    /// The session token is unknown or was already invalidated.
    #[error("invalid session")]
    InvalidSession,

    /// A request field is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No character has this id.
    #[error("character {0} not found")]
    CharacterNotFound(CharacterId),

    /// Another character already has this name.
    #[error("character name {0:?} is already in use")]
    CharacterNameInUse(String),

    /// The identity store failed in a way the registry can't classify.
    #[error("identity store failure: {0}")]
    Store(String),
}

impl SessionError {
    /// Maps this error onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) | Self::CharacterNotFound(_) => ErrorKind::NotFound,
            Self::UsernameInUse(_) | Self::CharacterNameInUse(_) => ErrorKind::AlreadyInUse,
            Self::AlreadyActive(_) => ErrorKind::AlreadyActive,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::InvalidSession => ErrorKind::InvalidSession,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}
