//! One game instance and the views handed out of the manager.

use thorium_protocol::{GameEntry, GameId, NewGame, ServerInfo};

use crate::GameState;

/// A game as the manager stores it.
#[derive(Debug, Clone)]
pub(crate) struct Game {
    pub(crate) game_id: GameId,
    pub(crate) request: NewGame,
    pub(crate) state: GameState,
}

impl Game {
    pub(crate) fn info(&self) -> GameInfo {
        GameInfo {
            game_id: self.game_id,
            map: self.request.map.clone(),
            mode: self.request.mode.clone(),
            minimum_level: self.request.minimum_level,
            max_players: self.request.max_players,
            state: self.state,
        }
    }
}

/// Snapshot of a game's settings and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub game_id: GameId,
    pub map: String,
    pub mode: String,
    pub minimum_level: u32,
    pub max_players: u32,
    pub state: GameState,
}

impl From<GameInfo> for GameEntry {
    fn from(info: GameInfo) -> Self {
        Self {
            game_id: info.game_id,
            map: info.map,
            mode: info.mode,
            minimum_level: info.minimum_level,
            max_players: info.max_players,
            status: info.state.status(),
        }
    }
}

/// Answer to a readiness poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPoll {
    /// No machine has claimed the game yet; ask again later.
    Pending,
    /// Connect here.
    Ready(ServerInfo),
}
