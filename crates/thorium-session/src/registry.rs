//! The session registry: register, login, and disconnect.
//!
//! This is where the "one live session per account" rule is enforced.
//! The store can answer "does this account have a session right now?",
//! but two logins racing on the same account could both see "no". The
//! registry closes that gap by running every operation for a username
//! under that username's lock ([`AccountLocks`]).
//!
//! ```text
//! register() ──→ [Live] ──→ disconnect() ──→ [None] ──→ login() ──→ [Live]
//!                  │                                                  │
//!                  └──── login() fails with AlreadyActive ◀───────────┘
//! ```

use std::sync::Arc;

use crate::locks::AccountLocks;
use crate::session::{generate_token, validate_credentials, validate_new_account};
use crate::{AccountRecord, IdentityStore, Session, SessionError, StoreError};

/// Enforces session semantics on top of an [`IdentityStore`].
pub struct SessionRegistry<S: IdentityStore> {
    store: Arc<S>,
    locks: AccountLocks,
}

impl<S: IdentityStore> SessionRegistry<S> {
    /// Creates a registry over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: AccountLocks::default(),
        }
    }

    /// Creates an account and its first session in one step.
    ///
    /// # Errors
    /// - [`SessionError::InvalidArgument`]: blank or oversized username, or
    ///   empty password
    /// - [`SessionError::UsernameInUse`]: the username is taken
    pub async fn register(&self, username: &str, password: &str) -> Result<Session, SessionError> {
        validate_new_account(username, password)?;
        let token = generate_token();

        let _guard = self.locks.acquire(username).await;
        let account = self
            .store
            .create_account(username, password, &token)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyInUse => SessionError::UsernameInUse(username.to_owned()),
                other => unclassified(other),
            })?;

        tracing::info!(account_id = %account.account_id, "account registered");
        Ok(Session {
            account_id: account.account_id,
            token,
            character_ids: account.character_ids,
        })
    }

    /// Opens a new session for an existing account.
    ///
    /// # Errors
    /// - [`SessionError::AccountNotFound`]: no such username
    /// - [`SessionError::InvalidCredential`]: wrong password
    /// - [`SessionError::AlreadyActive`]: the account is already logged in
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, SessionError> {
        validate_credentials(username, password)?;
        let token = generate_token();

        let _guard = self.locks.acquire(username).await;
        let account = self
            .store
            .check_credential(username, password)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => SessionError::AccountNotFound(username.to_owned()),
                StoreError::InvalidCredential => SessionError::InvalidCredential,
                other => unclassified(other),
            })?;

        self.store
            .open_session(account.account_id, &token)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyActive => SessionError::AlreadyActive(account.account_id),
                other => unclassified(other),
            })
            .inspect_err(|e| {
                tracing::debug!(account_id = %account.account_id, error = %e, "login rejected");
            })?;

        tracing::info!(account_id = %account.account_id, "account logged in");
        Ok(Session {
            account_id: account.account_id,
            token,
            character_ids: account.character_ids,
        })
    }

    /// Invalidates a session token.
    ///
    /// # Errors
    /// [`SessionError::InvalidSession`] if the token is unknown or was
    /// already disconnected. A repeated disconnect always fails.
    pub async fn disconnect(&self, token: &str) -> Result<(), SessionError> {
        let account = self.resolve(token).await?;

        let _guard = self.locks.acquire(&account.username).await;
        self.store.close_session(token).await.map_err(|e| match e {
            // Lost a race with another disconnect of the same token.
            StoreError::NotFound => SessionError::InvalidSession,
            other => unclassified(other),
        })?;

        tracing::info!(account_id = %account.account_id, "account disconnected");
        Ok(())
    }

    /// Resolves a live session token to its account.
    ///
    /// # Errors
    /// [`SessionError::InvalidSession`] if the token is unknown.
    pub async fn resolve(&self, token: &str) -> Result<AccountRecord, SessionError> {
        if token.is_empty() {
            return Err(SessionError::InvalidSession);
        }
        self.store.resolve_session(token).await.map_err(|e| match e {
            StoreError::NotFound => SessionError::InvalidSession,
            other => unclassified(other),
        })
    }
}

/// A store error the calling operation has no specific meaning for.
pub(crate) fn unclassified(err: StoreError) -> SessionError {
    match err {
        StoreError::InvalidArgument(msg) => SessionError::InvalidArgument(msg),
        other => SessionError::Store(other.to_string()),
    }
}

// =========================================================================
// Tests
// =========================================================================
