//! Game manager: creates games, hands them to machines, answers polls.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thorium_fleet::MachineRegistry;
use thorium_protocol::{GameId, GameStatus, MachineId, NewGame, ServerInfo};
use tokio::sync::{Mutex, RwLock};

use crate::game::Game;
use crate::{GameConfig, GameError, GameInfo, GameState, MachineLossPolicy, ServerPoll};

/// Owns every game and its lifecycle state.
///
/// Each game sits behind its own lock, which is the compare-and-set
/// boundary for `Pending → Registered`: whoever takes the lock first and
/// still sees `Pending` wins, everyone after sees `Registered` and fails.
/// The map lock is only held long enough to find or insert a game.
pub struct GameManager {
    config: GameConfig,
    next_id: AtomicU64,
    games: RwLock<HashMap<GameId, Arc<Mutex<Game>>>>,
}

impl GameManager {
    /// Creates a new, empty game manager.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            games: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates a game in `Pending` and returns its id.
    ///
    /// # Errors
    /// [`GameError::MissingMap`] if the map name is blank.
    pub async fn create(&self, request: NewGame) -> Result<GameId, GameError> {
        if request.map.trim().is_empty() {
            return Err(GameError::MissingMap);
        }

        let game_id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(
            %game_id,
            map = %request.map,
            mode = %request.mode,
            max_players = request.max_players,
            "game created"
        );

        let game = Game {
            game_id,
            request,
            state: GameState::Pending,
        };
        self.games
            .write()
            .await
            .insert(game_id, Arc::new(Mutex::new(game)));
        Ok(game_id)
    }

    /// Assigns a game to the machine that will host it.
    ///
    /// The address clients will connect to is the one the fleet recorded
    /// when the machine registered. Succeeds once per game.
    ///
    /// # Errors
    /// - [`GameError::MissingPort`]: `port` is `0`
    /// - [`GameError::NotFound`]: unknown game
    /// - [`GameError::MachineNotActive`]: the machine is unknown or silent
    /// - [`GameError::AlreadyRegistered`]: the game already has a host;
    ///   the stored address and port are left untouched
    pub async fn register_server(
        &self,
        game_id: GameId,
        machine_id: MachineId,
        port: u16,
        fleet: &MachineRegistry,
    ) -> Result<ServerInfo, GameError> {
        if port == 0 {
            return Err(GameError::MissingPort);
        }
        let game = self.game(game_id).await?;

        let Some(address) = fleet.active_address(machine_id).await else {
            tracing::warn!(%game_id, %machine_id, "inactive machine tried to host a game");
            return Err(GameError::MachineNotActive(machine_id));
        };

        let mut game = game.lock().await;
        if !game.state.can_transition_to(GameStatus::Registered) {
            tracing::warn!(%game_id, %machine_id, state = %game.state, "game already hosted");
            return Err(GameError::AlreadyRegistered(game_id));
        }
        game.state = GameState::Registered {
            host: machine_id,
            address,
            port,
        };

        tracing::info!(%game_id, %machine_id, %address, port, "game server registered");
        Ok(ServerInfo {
            remote_address: address.to_string(),
            port,
        })
    }

    /// Reads where a game can be joined. Never blocks waiting for a host.
    ///
    /// # Errors
    /// [`GameError::NotFound`] for an unknown game, [`GameError::Unavailable`]
    /// once its host has been lost.
    pub async fn server_info(&self, game_id: GameId) -> Result<ServerPoll, GameError> {
        let game = self.game(game_id).await?;
        let state = game.lock().await.state;

        match state {
            GameState::Pending => Ok(ServerPoll::Pending),
            GameState::Registered { address, port, .. } => Ok(ServerPoll::Ready(ServerInfo {
                remote_address: address.to_string(),
                port,
            })),
            GameState::Unavailable => Err(GameError::Unavailable(game_id)),
        }
    }

    /// Applies the machine loss policy to every game hosted by `machine_id`.
    ///
    /// Returns the games that became `Unavailable`. Pending games are never
    /// touched.
    pub async fn machine_lost(&self, machine_id: MachineId) -> Vec<GameId> {
        if self.config.loss_policy == MachineLossPolicy::KeepStale {
            tracing::debug!(%machine_id, "machine lost, keeping its games as they are");
            return Vec::new();
        }

        let games: Vec<_> = self.games.read().await.values().cloned().collect();
        let mut lost = Vec::new();
        for game in games {
            let mut game = game.lock().await;
            if game.state.host() == Some(machine_id) {
                game.state = GameState::Unavailable;
                lost.push(game.game_id);
                tracing::warn!(game_id = %game.game_id, %machine_id, "host lost, game unavailable");
            }
        }
        lost.sort_unstable();
        lost
    }

    /// Returns a snapshot of one game.
    pub async fn get(&self, game_id: GameId) -> Result<GameInfo, GameError> {
        let game = self.game(game_id).await?;
        let info = game.lock().await.info();
        Ok(info)
    }

    /// Snapshots every game, ordered by id.
    pub async fn list(&self) -> Vec<GameInfo> {
        let games: Vec<_> = self.games.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(games.len());
        for game in games {
            infos.push(game.lock().await.info());
        }
        infos.sort_unstable_by_key(|info| info.game_id);
        infos
    }

    /// Returns the number of games, in any state.
    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    async fn game(&self, game_id: GameId) -> Result<Arc<Mutex<Game>>, GameError> {
        self.games
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(GameError::NotFound(game_id))
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use thorium_protocol::{DEFAULT_MAX_PLAYERS, ErrorKind};

    use super::*;

    const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

    fn sandbox() -> NewGame {
        NewGame {
            map: "Map_Sandbox".into(),
            mode: "Tutorial".into(),
            minimum_level: 1,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }

    async fn active_machine(fleet: &MachineRegistry) -> MachineId {
        fleet.register(HOST, 9000).await.unwrap().0
    }

    // =====================================================================
    // create()
    // =====================================================================

    #[tokio::test]
    async fn test_create_returns_unique_nonzero_ids() {
        let games = GameManager::default();

        let a = games.create(sandbox()).await.unwrap();
        let b = games.create(sandbox()).await.unwrap();

        assert!(!a.is_unset());
        assert_ne!(a, b);
        assert_eq!(games.game_count().await, 2);
    }

    #[tokio::test]
    async fn test_create_blank_map_returns_missing_map() {
        let games = GameManager::default();
        let request = NewGame {
            map: "  ".into(),
            ..sandbox()
        };

        let result = games.create(request).await;

        assert_eq!(result, Err(GameError::MissingMap));
        assert_eq!(games.game_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let games = GameManager::default();
        let id = games.create(sandbox()).await.unwrap();

        let info = games.get(id).await.unwrap();

        assert_eq!(info.state, GameState::Pending);
        assert_eq!(info.map, "Map_Sandbox");
        assert_eq!(info.max_players, 16);
    }

    // =====================================================================
    // register_server()
    // =====================================================================

    #[tokio::test]
    async fn test_register_server_pending_game_succeeds() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let id = games.create(sandbox()).await.unwrap();

        let info = games.register_server(id, machine, 7777, &fleet).await.unwrap();

        assert_eq!(info.remote_address, "192.168.1.20");
        assert_eq!(info.port, 7777);
        assert_eq!(games.get(id).await.unwrap().state.host(), Some(machine));
    }

    #[tokio::test]
    async fn test_register_server_port_zero_returns_missing_port() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let id = games.create(sandbox()).await.unwrap();

        let result = games.register_server(id, machine, 0, &fleet).await;

        assert_eq!(result, Err(GameError::MissingPort));
    }

    #[tokio::test]
    async fn test_register_server_unknown_game_returns_not_found() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;

        let result = games.register_server(GameId(99), machine, 7777, &fleet).await;

        assert_eq!(result, Err(GameError::NotFound(GameId(99))));
    }

    #[tokio::test]
    async fn test_register_server_unknown_machine_returns_not_active() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let id = games.create(sandbox()).await.unwrap();

        let result = games.register_server(id, MachineId(5), 7777, &fleet).await;

        assert_eq!(result, Err(GameError::MachineNotActive(MachineId(5))));
        assert_eq!(games.server_info(id).await, Ok(ServerPoll::Pending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_server_silent_machine_returns_not_active() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let id = games.create(sandbox()).await.unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;
        let result = games.register_server(id, machine, 7777, &fleet).await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_register_server_twice_returns_conflict_and_keeps_first() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let first = active_machine(&fleet).await;
        let (second, _) = fleet
            .register(IpAddr::V4(Ipv4Addr::new(10, 9, 9, 9)), 9000)
            .await
            .unwrap();
        let id = games.create(sandbox()).await.unwrap();
        games.register_server(id, first, 7777, &fleet).await.unwrap();

        let result = games.register_server(id, second, 8888, &fleet).await;

        assert_eq!(result, Err(GameError::AlreadyRegistered(id)));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
        let poll = games.server_info(id).await.unwrap();
        assert_eq!(
            poll,
            ServerPoll::Ready(ServerInfo {
                remote_address: "192.168.1.20".into(),
                port: 7777,
            })
        );
    }

    // =====================================================================
    // server_info()
    // =====================================================================

    #[tokio::test]
    async fn test_server_info_unknown_game_returns_not_found() {
        let games = GameManager::default();

        let result = games.server_info(GameId(1)).await;

        assert_eq!(result, Err(GameError::NotFound(GameId(1))));
    }

    #[tokio::test]
    async fn test_server_info_is_stable_after_registration() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let id = games.create(sandbox()).await.unwrap();
        games.register_server(id, machine, 7777, &fleet).await.unwrap();

        let first = games.server_info(id).await.unwrap();
        let second = games.server_info(id).await.unwrap();

        assert_eq!(first, second);
    }

    // =====================================================================
    // machine_lost()
    // =====================================================================

    #[tokio::test]
    async fn test_machine_lost_marks_hosted_games_unavailable() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let hosted = games.create(sandbox()).await.unwrap();
        let waiting = games.create(sandbox()).await.unwrap();
        games.register_server(hosted, machine, 7777, &fleet).await.unwrap();

        let lost = games.machine_lost(machine).await;

        assert_eq!(lost, vec![hosted]);
        assert_eq!(games.server_info(hosted).await, Err(GameError::Unavailable(hosted)));
        assert_eq!(games.server_info(waiting).await, Ok(ServerPoll::Pending));
    }

    #[tokio::test]
    async fn test_machine_lost_keep_stale_leaves_address() {
        let fleet = MachineRegistry::default();
        let games = GameManager::new(GameConfig {
            loss_policy: MachineLossPolicy::KeepStale,
        });
        let machine = active_machine(&fleet).await;
        let id = games.create(sandbox()).await.unwrap();
        games.register_server(id, machine, 7777, &fleet).await.unwrap();

        let lost = games.machine_lost(machine).await;

        assert!(lost.is_empty());
        assert!(matches!(games.server_info(id).await, Ok(ServerPoll::Ready(_))));
    }

    #[tokio::test]
    async fn test_unavailable_game_rejects_new_host() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let id = games.create(sandbox()).await.unwrap();
        games.register_server(id, machine, 7777, &fleet).await.unwrap();
        games.machine_lost(machine).await;

        let replacement = active_machine(&fleet).await;
        let result = games.register_server(id, replacement, 7777, &fleet).await;

        assert_eq!(result, Err(GameError::AlreadyRegistered(id)));
    }

    // =====================================================================
    // list()
    // =====================================================================

    #[tokio::test]
    async fn test_list_returns_all_states_in_id_order() {
        let fleet = MachineRegistry::default();
        let games = GameManager::default();
        let machine = active_machine(&fleet).await;
        let a = games.create(sandbox()).await.unwrap();
        let b = games.create(sandbox()).await.unwrap();
        games.register_server(b, machine, 7777, &fleet).await.unwrap();

        let infos = games.list().await;

        let statuses: Vec<_> = infos.iter().map(|i| (i.game_id, i.state.status())).collect();
        assert_eq!(
            statuses,
            vec![(a, GameStatus::Pending), (b, GameStatus::Registered)]
        );
    }
}
