//! Async HTTP client for the Thorium master service.
//!
//! One method per master route, for both sides of the service:
//!
//! - **Players**: register, log in, create characters, create games, and
//!   poll for a game's server with [`MasterClient::wait_for_server`].
//! - **Machines**: register, send heartbeats, claim games, report
//!   character positions, and leave the fleet.
//!
//! ```rust,no_run
//! use thorium_client::MasterClient;
//! use thorium_protocol::NewGame;
//!
//! # async fn run() -> Result<(), thorium_client::ClientError> {
//! let client = MasterClient::new("http://127.0.0.1:6960");
//! let session = client.register("alice", "hunter2").await?;
//! let game_id = client
//!     .create_game(&NewGame {
//!         map: "Map_Sandbox".into(),
//!         mode: "Tutorial".into(),
//!         minimum_level: 1,
//!         max_players: 16,
//!     })
//!     .await?;
//! let server = client.wait_for_server(game_id).await?;
//! println!("{} joins {}:{}", session.session_key, server.remote_address, server.port);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{MasterClient, PollConfig, Readiness};
pub use error::ClientError;
