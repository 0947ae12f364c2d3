//! # Thorium
//!
//! Master service for session-based multiplayer games.
//!
//! Players register, log in, and create characters; worker machines join
//! the fleet and heartbeat their load; games are created `Pending` and
//! claimed by a machine, after which polling clients learn where to
//! connect. Everything is served over HTTP with JSON bodies.
//!
//! ```text
//!            ┌──────────── Master<S> ────────────┐
//!  HTTP ───→ │ SessionRegistry  CharacterRegistry │ ───→ IdentityStore
//!            │ MachineRegistry  GameManager       │
//!            └────────────────────────────────────┘
//!                      ↑ liveness sweeper
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thorium::prelude::*;
//!
//! # async fn run() -> Result<(), ThoriumError> {
//! let server = ThoriumServerBuilder::new()
//!     .bind("0.0.0.0:6960")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod api;
mod error;
mod master;
mod routes;
mod server;

pub use api::ApiError;
pub use error::ThoriumError;
pub use master::Master;
pub use routes::router;
pub use server::{ThoriumServer, ThoriumServerBuilder};

pub mod prelude {
    pub use crate::{Master, ThoriumError, ThoriumServer, ThoriumServerBuilder};
    pub use thorium_fleet::{FleetConfig, LoadSample, MachineRegistry};
    pub use thorium_game::{GameConfig, GameManager, MachineLossPolicy, ServerPoll};
    pub use thorium_protocol::{ErrorKind, GameId, MachineId};
    pub use thorium_session::{IdentityStore, MemoryStore};
}
