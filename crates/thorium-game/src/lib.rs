//! Game lifecycle management for Thorium.
//!
//! A game is created `Pending`, claimed exactly once by a fleet machine
//! (`Registered`), and becomes `Unavailable` if that machine is lost.
//! Clients find out where to connect by polling [`GameManager::server_info`].
//!
//! # Key types
//!
//! - [`GameManager`]: creates games, registers servers, answers polls
//! - [`GameState`]: lifecycle state machine
//! - [`GameInfo`]: a snapshot of one game
//! - [`ServerPoll`]: pending, or where to connect
//! - [`GameConfig`] / [`MachineLossPolicy`]: what machine loss does

mod config;
mod error;
mod game;
mod manager;

pub use config::{GameConfig, GameState, MachineLossPolicy};
pub use error::GameError;
pub use game::{GameInfo, ServerPoll};
pub use manager::GameManager;
