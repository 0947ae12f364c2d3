//! Wire protocol for the Thorium master service.
//!
//! This crate defines the vocabulary shared by the master service, its
//! clients, and the machines in the fleet:
//!
//! - **Identity types** ([`AccountId`], [`CharacterId`], [`MachineId`],
//!   [`GameId`]): newtypes so ids of different entities can't be mixed up.
//! - **Request/response bodies** ([`Authentication`], [`LoginResponse`],
//!   [`NewGame`], [`ServerInfo`], etc.): the JSON bodies of every route.
//! - **Error kinds** ([`ErrorKind`]): the closed taxonomy every core
//!   operation reports, independent of HTTP.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies become bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about registries or HTTP routing.
//! It only describes what travels between the parties:
//!
//! ```text
//! Client / Machine  ──(JSON bodies)──→  Master service
//!                   ←─(JSON bodies)───
//! ```

mod codec;
mod error;
mod kind;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use kind::ErrorKind;
pub use types::{
    AccountId, Authentication, CharacterCreated, CharacterId, CharacterView,
    ClassId, CreateCharacter, Disconnect, ErrorBody, GameCreated, GameEntry,
    GameId, GameStatus, LoginResponse, MachineEntry, MachineId,
    MachineRegistered, MachineStatus, NewGame, RegisterGameServer,
    RegisterMachine, ServerInfo, UnregisterMachine, UpdatePosition, Vector3,
    DEFAULT_MAX_PLAYERS,
};
