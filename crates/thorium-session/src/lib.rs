//! Account sessions and characters for the Thorium master service.
//!
//! This crate owns everything a player does before a game exists:
//!
//! 1. **Identity storage**: the [`IdentityStore`] contract, plus the
//!    in-process [`MemoryStore`] implementation
//! 2. **Sessions**: register, login, and disconnect with at most one live
//!    session per account ([`SessionRegistry`])
//! 3. **Characters**: creation by a session holder and public profile
//!    reads ([`CharacterRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Master service (above)  ← routes HTTP requests into the registries
//!     ↕
//! Session Layer (this crate)  ← enforces session and ownership rules
//!     ↕
//! Identity Store (below)  ← durable accounts, credentials, sessions
//! ```

mod characters;
mod error;
mod locks;
mod memory;
mod registry;
mod session;
mod store;

pub use characters::CharacterRegistry;
pub use error::SessionError;
pub use memory::MemoryStore;
pub use registry::SessionRegistry;
pub use session::Session;
pub use store::{AccountRecord, CharacterRecord, IdentityStore, StoreError};
