//! An in-process [`IdentityStore`].
//!
//! Everything lives behind one `tokio::sync::Mutex`, which makes every
//! trait method trivially atomic. Good for a single master instance and
//! for tests; a deployment with several masters needs a shared store.

use std::collections::HashMap;

use rand::Rng;
use sha2::{Digest, Sha256};
use thorium_protocol::{AccountId, CharacterId, ClassId, Vector3};
use tokio::sync::Mutex;

use crate::{AccountRecord, CharacterRecord, IdentityStore, StoreError};

/// Salted SHA-256 of a password.
struct Credential {
    salt: [u8; 16],
    digest: Vec<u8>,
}

impl Credential {
    fn new(password: &str) -> Self {
        let salt: [u8; 16] = rand::rng().random();
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    fn matches(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.digest
    }
}

fn digest(salt: &[u8; 16], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

struct Account {
    username: String,
    credential: Credential,
    characters: Vec<CharacterId>,
}

impl Account {
    fn record(&self, account_id: AccountId) -> AccountRecord {
        AccountRecord {
            account_id,
            username: self.username.clone(),
            character_ids: self.characters.clone(),
        }
    }
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    usernames: HashMap<String, AccountId>,
    /// Live session token → account.
    sessions: HashMap<String, AccountId>,
    /// Account → its live session token. Kept in sync with `sessions`.
    live: HashMap<AccountId, String>,
    characters: HashMap<CharacterId, CharacterRecord>,
    character_names: HashMap<String, CharacterId>,
    last_account_id: u64,
    last_character_id: u64,
}

impl Inner {
    fn record(&self, account_id: AccountId) -> Result<AccountRecord, StoreError> {
        self.accounts
            .get(&account_id)
            .map(|account| account.record(account_id))
            .ok_or(StoreError::NotFound)
    }
}

/// Accounts, sessions, and characters held in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryStore {
    async fn create_account(
        &self,
        username: &str,
        password: &str,
        token: &str,
    ) -> Result<AccountRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.usernames.contains_key(username) {
            return Err(StoreError::AlreadyInUse);
        }

        inner.last_account_id += 1;
        let account_id = AccountId(inner.last_account_id);
        let account = Account {
            username: username.to_owned(),
            credential: Credential::new(password),
            characters: Vec::new(),
        };
        let record = account.record(account_id);

        inner.usernames.insert(username.to_owned(), account_id);
        inner.accounts.insert(account_id, account);
        inner.sessions.insert(token.to_owned(), account_id);
        inner.live.insert(account_id, token.to_owned());
        Ok(record)
    }

    async fn check_credential(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccountRecord, StoreError> {
        let inner = self.inner.lock().await;
        let account_id = *inner.usernames.get(username).ok_or(StoreError::NotFound)?;
        let account = inner.accounts.get(&account_id).ok_or(StoreError::NotFound)?;
        if !account.credential.matches(password) {
            return Err(StoreError::InvalidCredential);
        }
        Ok(account.record(account_id))
    }

    async fn open_session(&self, account_id: AccountId, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.accounts.contains_key(&account_id) {
            return Err(StoreError::NotFound);
        }
        if inner.live.contains_key(&account_id) {
            return Err(StoreError::AlreadyActive);
        }
        inner.sessions.insert(token.to_owned(), account_id);
        inner.live.insert(account_id, token.to_owned());
        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> Result<AccountRecord, StoreError> {
        let inner = self.inner.lock().await;
        let account_id = *inner.sessions.get(token).ok_or(StoreError::NotFound)?;
        inner.record(account_id)
    }

    async fn close_session(&self, token: &str) -> Result<AccountId, StoreError> {
        let mut inner = self.inner.lock().await;
        let account_id = inner.sessions.remove(token).ok_or(StoreError::NotFound)?;
        inner.live.remove(&account_id);
        Ok(account_id)
    }

    async fn create_character(
        &self,
        owner: AccountId,
        name: &str,
        class_id: ClassId,
    ) -> Result<CharacterId, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidArgument("character name is empty".into()));
        }
        if class_id.0 == 0 {
            return Err(StoreError::InvalidArgument("class id 0 is reserved".into()));
        }

        let mut inner = self.inner.lock().await;
        if !inner.accounts.contains_key(&owner) {
            return Err(StoreError::NotFound);
        }
        if inner.character_names.contains_key(name) {
            return Err(StoreError::AlreadyInUse);
        }

        inner.last_character_id += 1;
        let character_id = CharacterId(inner.last_character_id);
        inner.characters.insert(
            character_id,
            CharacterRecord {
                character_id,
                owner,
                name: name.to_owned(),
                class_id,
                position: Vector3::ZERO,
            },
        );
        inner.character_names.insert(name.to_owned(), character_id);
        if let Some(account) = inner.accounts.get_mut(&owner) {
            account.characters.push(character_id);
        }
        Ok(character_id)
    }

    async fn character(&self, character_id: CharacterId) -> Result<CharacterRecord, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .characters
            .get(&character_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_position(
        &self,
        character_id: CharacterId,
        position: Vector3,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let character = inner
            .characters
            .get_mut(&character_id)
            .ok_or(StoreError::NotFound)?;
        character.position = position;
        Ok(())
    }
}
