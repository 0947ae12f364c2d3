//! The identity store contract.
//!
//! Thorium doesn't care where accounts live: a database, a directory
//! service, or the process heap. It defines the [`IdentityStore`] trait
//! and the session and character registries are written against it.
//! [`MemoryStore`](crate::MemoryStore) is the in-process implementation.
//!
//! Failures come back as a closed [`StoreError`] enum so callers match on
//! variants, never on message text.

use std::future::Future;

use thorium_protocol::{AccountId, CharacterId, CharacterView, ClassId, ErrorKind, Vector3};

/// Errors reported by an [`IdentityStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record matches the lookup key.
    #[error("does not exist")]
    NotFound,

    /// A unique key (username, character name) is taken.
    #[error("already in use")]
    AlreadyInUse,

    /// The account already has a live session.
    #[error("already logged in")]
    AlreadyActive,

    /// The password did not match.
    #[error("invalid password")]
    InvalidCredential,

    /// The store refused a malformed value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backend itself failed (connection lost, disk full, ...).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error kind this failure represents on its own.
    ///
    /// Registries refine this with context (a `NotFound` while resolving a
    /// token is an invalid session, not a missing record).
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::AlreadyInUse => ErrorKind::AlreadyInUse,
            Self::AlreadyActive => ErrorKind::AlreadyActive,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Backend(_) => ErrorKind::Internal,
        }
    }
}

/// An account as the registries see it. The credential never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account_id: AccountId,
    pub username: String,
    pub character_ids: Vec<CharacterId>,
}

/// A stored character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRecord {
    pub character_id: CharacterId,
    pub owner: AccountId,
    pub name: String,
    pub class_id: ClassId,
    pub position: Vector3,
}

impl From<CharacterRecord> for CharacterView {
    fn from(record: CharacterRecord) -> Self {
        Self {
            character_id: record.character_id,
            name: record.name,
            class_id: record.class_id,
            position: record.position,
        }
    }
}

/// Durable storage for accounts, credentials, sessions, and characters.
///
/// Every method is a single atomic step from the caller's point of view.
/// Cross-call invariants (one live session per account under concurrent
/// logins) are enforced by [`SessionRegistry`](crate::SessionRegistry)
/// on top of these primitives.
///
/// The futures are `Send` so registries can be driven from any Tokio
/// worker thread.
pub trait IdentityStore: Send + Sync + 'static {
    /// Creates an account together with its first live session `token`.
    ///
    /// # Errors
    /// [`StoreError::AlreadyInUse`] if the username is taken. On any error
    /// neither the account nor the session exists afterwards.
    fn create_account(
        &self,
        username: &str,
        password: &str,
        token: &str,
    ) -> impl Future<Output = Result<AccountRecord, StoreError>> + Send;

    /// Verifies a username/password pair.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown username,
    /// [`StoreError::InvalidCredential`] for a wrong password.
    fn check_credential(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AccountRecord, StoreError>> + Send;

    /// Binds a new live session `token` to the account.
    ///
    /// # Errors
    /// [`StoreError::AlreadyActive`] if the account has a live session,
    /// [`StoreError::NotFound`] if the account doesn't exist.
    fn open_session(
        &self,
        account_id: AccountId,
        token: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns the account owning a live session token.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the token is unknown or invalidated.
    fn resolve_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<AccountRecord, StoreError>> + Send;

    /// Invalidates a live session token.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the token is unknown or already invalidated.
    fn close_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<AccountId, StoreError>> + Send;

    /// Creates a character owned by `owner` at the world origin.
    ///
    /// # Errors
    /// [`StoreError::InvalidArgument`] for an empty name or class id `0`,
    /// [`StoreError::AlreadyInUse`] for a taken character name.
    fn create_character(
        &self,
        owner: AccountId,
        name: &str,
        class_id: ClassId,
    ) -> impl Future<Output = Result<CharacterId, StoreError>> + Send;

    /// Looks up a character.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    fn character(
        &self,
        character_id: CharacterId,
    ) -> impl Future<Output = Result<CharacterRecord, StoreError>> + Send;

    /// Overwrites a character's world position.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    fn update_position(
        &self,
        character_id: CharacterId,
        position: Vector3,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
