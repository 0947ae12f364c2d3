//! Character creation and lookup.

use std::sync::Arc;

use thorium_protocol::{CharacterId, CharacterView, ClassId, Vector3};

use crate::registry::unclassified;
use crate::{IdentityStore, SessionError, StoreError};

/// Creates characters for session holders and serves public profiles.
pub struct CharacterRegistry<S: IdentityStore> {
    store: Arc<S>,
}

impl<S: IdentityStore> CharacterRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a character owned by the account behind `token`.
    ///
    /// The new character starts at the world origin.
    ///
    /// # Errors
    /// - [`SessionError::InvalidSession`]: the token doesn't resolve
    /// - [`SessionError::InvalidArgument`]: empty name or class id `0`
    /// - [`SessionError::CharacterNameInUse`]: the name is taken
    pub async fn create(
        &self,
        token: &str,
        name: &str,
        class_id: ClassId,
    ) -> Result<CharacterId, SessionError> {
        let owner = self.store.resolve_session(token).await.map_err(|e| match e {
            StoreError::NotFound => SessionError::InvalidSession,
            other => unclassified(other),
        })?;

        let character_id = self
            .store
            .create_character(owner.account_id, name, class_id)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyInUse => SessionError::CharacterNameInUse(name.to_owned()),
                other => unclassified(other),
            })?;

        if character_id.is_unset() {
            return Err(SessionError::Store("store returned the reserved character id".into()));
        }

        tracing::info!(%character_id, account_id = %owner.account_id, "character created");
        Ok(character_id)
    }

    /// Fetches a character's public profile. No ownership check.
    pub async fn get(&self, character_id: CharacterId) -> Result<CharacterView, SessionError> {
        self.store
            .character(character_id)
            .await
            .map(CharacterView::from)
            .map_err(|e| match e {
                StoreError::NotFound => SessionError::CharacterNotFound(character_id),
                other => unclassified(other),
            })
    }

    /// Overwrites a character's position. Callers authenticate the writer.
    pub async fn update_position(
        &self,
        character_id: CharacterId,
        position: Vector3,
    ) -> Result<(), SessionError> {
        self.store
            .update_position(character_id, position)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => SessionError::CharacterNotFound(character_id),
                other => unclassified(other),
            })?;

        tracing::debug!(%character_id, "character position updated");
        Ok(())
    }
}
