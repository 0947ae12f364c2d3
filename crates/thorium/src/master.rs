//! The composed master state shared by every request handler.
//!
//! Each registry guards its own data. Operations that span two of them
//! (a machine leaving takes its games with it, a machine hosting a game
//! must prove who it is) live here, as a sequence of single-registry
//! steps with explicit compensation. No registry lock is held while
//! another registry is called.

use std::sync::Arc;

use thorium_fleet::{FleetConfig, FleetError, MachineRegistry};
use thorium_game::{GameConfig, GameManager};
use thorium_protocol::{CharacterId, GameId, MachineId, RegisterGameServer, ServerInfo, Vector3};
use thorium_session::{CharacterRegistry, IdentityStore, SessionRegistry};

use crate::ThoriumError;

/// All registries of one master instance.
pub struct Master<S: IdentityStore> {
    sessions: SessionRegistry<S>,
    characters: CharacterRegistry<S>,
    fleet: MachineRegistry,
    games: GameManager,
}

impl<S: IdentityStore> Master<S> {
    pub fn new(store: Arc<S>, fleet_config: FleetConfig, game_config: GameConfig) -> Self {
        Self {
            sessions: SessionRegistry::new(Arc::clone(&store)),
            characters: CharacterRegistry::new(store),
            fleet: MachineRegistry::new(fleet_config),
            games: GameManager::new(game_config),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry<S> {
        &self.sessions
    }

    pub fn characters(&self) -> &CharacterRegistry<S> {
        &self.characters
    }

    pub fn fleet(&self) -> &MachineRegistry {
        &self.fleet
    }

    pub fn games(&self) -> &GameManager {
        &self.games
    }

    /// Removes a machine and applies the loss policy to its games.
    ///
    /// `claimed` is the id named in the request path, if any; it must match
    /// the machine the token was issued to.
    ///
    /// # Errors
    /// [`FleetError::InvalidToken`] for an unknown token or a mismatched id.
    pub async fn unregister_machine(
        &self,
        token: &str,
        claimed: Option<MachineId>,
    ) -> Result<MachineId, ThoriumError> {
        if let Some(claimed) = claimed {
            let owner = self.fleet.authenticate(token).await?;
            if owner != claimed {
                tracing::warn!(%claimed, "machine token presented for another machine");
                return Err(FleetError::InvalidToken.into());
            }
        }

        let machine_id = self.fleet.unregister(token).await?;
        self.games.machine_lost(machine_id).await;
        Ok(machine_id)
    }

    /// Lets a fleet machine claim a pending game.
    ///
    /// # Errors
    /// - [`FleetError::InvalidToken`]: the token doesn't belong to `machine_id`
    /// - any [`GameError`](thorium_game::GameError) from the registration
    pub async fn register_server(
        &self,
        game_id: GameId,
        request: RegisterGameServer,
    ) -> Result<ServerInfo, ThoriumError> {
        let owner = self.fleet.authenticate(&request.machine_token).await?;
        if owner != request.machine_id {
            tracing::warn!(%game_id, claimed = %request.machine_id, "machine token presented for another machine");
            return Err(FleetError::InvalidToken.into());
        }

        let info = self
            .games
            .register_server(game_id, request.machine_id, request.port, &self.fleet)
            .await?;

        // The machine may have been swept between the liveness check and the
        // state change; the sweep's cascade could not have seen this game yet.
        if !self.fleet.is_active(request.machine_id).await {
            self.games.machine_lost(request.machine_id).await;
        }
        Ok(info)
    }

    /// Stores a character position reported by a live fleet machine.
    ///
    /// # Errors
    /// [`FleetError::InvalidToken`] unless the token belongs to an Active
    /// machine; `CharacterNotFound` for an unknown character.
    pub async fn update_position(
        &self,
        character_id: CharacterId,
        machine_token: &str,
        position: Vector3,
    ) -> Result<(), ThoriumError> {
        let machine_id = self.fleet.authenticate(machine_token).await?;
        if !self.fleet.is_active(machine_id).await {
            return Err(FleetError::InvalidToken.into());
        }
        self.characters.update_position(character_id, position).await?;
        Ok(())
    }

    /// Drops machines that missed their heartbeats and cascades the loss.
    ///
    /// Returns the expired machines.
    pub async fn sweep(&self) -> Vec<MachineId> {
        let expired = self.fleet.expire_stale().await;
        for machine_id in &expired {
            let lost = self.games.machine_lost(*machine_id).await;
            if !lost.is_empty() {
                tracing::info!(%machine_id, games = lost.len(), "expired machine took games down");
            }
        }
        expired
    }
}
