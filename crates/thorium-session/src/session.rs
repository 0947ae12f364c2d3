//! Session types: what a player gets back from register or login.

use rand::Rng;
use thorium_protocol::{AccountId, CharacterId, LoginResponse};

use crate::SessionError;

/// Longest accepted username, in bytes.
const MAX_USERNAME_LEN: usize = 64;

/// A live session handed to a player after register or login.
///
/// The `token` is a bearer credential: whoever presents it acts as the
/// account until it is disconnected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Which account this session belongs to.
    pub account_id: AccountId,

    /// A 32-character hex string (128 bits of randomness).
    pub token: String,

    /// Characters the account owned when the session was opened.
    pub character_ids: Vec<CharacterId>,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            session_key: session.token,
            character_ids: session.character_ids,
        }
    }
}

/// Rejects credentials that can never be valid before touching the store.
pub(crate) fn validate_credentials(username: &str, password: &str) -> Result<(), SessionError> {
    if username.trim().is_empty() {
        return Err(SessionError::InvalidArgument("username is empty".into()));
    }
    if password.is_empty() {
        return Err(SessionError::InvalidArgument("password is empty".into()));
    }
    Ok(())
}

/// Like [`validate_credentials`], plus the limits a new account must meet.
///
/// Only registration applies these; a login with an oversized name simply
/// finds no account.
pub(crate) fn validate_new_account(username: &str, password: &str) -> Result<(), SessionError> {
    validate_credentials(username, password)?;
    if username.len() > MAX_USERNAME_LEN {
        return Err(SessionError::InvalidArgument(format!(
            "username is longer than {MAX_USERNAME_LEN} bytes"
        )));
    }
    Ok(())
}

/// Generates a random 32-character hex string (128 bits of entropy).
pub(crate) fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
