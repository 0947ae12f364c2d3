//! The master client.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thorium_protocol::{
    Authentication, CharacterCreated, CharacterId, CharacterView, ClassId, Codec, CreateCharacter,
    Disconnect, ErrorBody, GameCreated, GameEntry, GameId, JsonCodec, LoginResponse, MachineEntry,
    MachineId, MachineRegistered, MachineStatus, NewGame, RegisterGameServer, RegisterMachine,
    ServerInfo, UnregisterMachine, UpdatePosition, Vector3,
};

use crate::ClientError;

/// Retry budget for [`MasterClient::wait_for_server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// How many times to ask before giving up.
    pub attempts: u32,

    /// Pause between two polls.
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(50),
        }
    }
}

/// One answer from the server-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// 202: no machine has claimed the game yet.
    Pending,
    /// 200: connect here.
    Ready(ServerInfo),
}

/// Talks to one master over HTTP.
#[derive(Debug, Clone)]
pub struct MasterClient<C: Codec = JsonCodec> {
    http: reqwest::Client,
    base_url: String,
    codec: C,
    poll: PollConfig,
}

impl MasterClient<JsonCodec> {
    /// Creates a client for the master at `base_url`, e.g.
    /// `http://127.0.0.1:6960`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_codec(base_url, JsonCodec)
    }
}

impl<C: Codec> MasterClient<C> {
    pub fn with_codec(base_url: impl Into<String>, codec: C) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            codec,
            poll: PollConfig::default(),
        }
    }

    /// Replaces the polling budget used by [`wait_for_server`](Self::wait_for_server).
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- Status -----------------------------------------------------------

    /// Checks that the master is up.
    pub async fn status(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::GET, "/status", None::<&()>)?)
            .await
            .map(drop)
    }

    // -- Players ----------------------------------------------------------

    pub async fn register(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = Authentication {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.call(Method::POST, "/clients/register", Some(&body)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = Authentication {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.call(Method::POST, "/clients/login", Some(&body)).await
    }

    pub async fn disconnect(&self, session_key: &str) -> Result<(), ClientError> {
        let body = Disconnect {
            session_key: session_key.to_owned(),
        };
        self.call_unit(Method::POST, "/clients/disconnect", &body).await
    }

    pub async fn create_character(
        &self,
        session_key: &str,
        name: &str,
        class_id: ClassId,
    ) -> Result<CharacterId, ClientError> {
        let body = CreateCharacter {
            session_key: session_key.to_owned(),
            name: name.to_owned(),
            class_id,
        };
        let created: CharacterCreated = self.call(Method::POST, "/characters/new", Some(&body)).await?;
        Ok(created.character_id)
    }

    pub async fn character(&self, character_id: CharacterId) -> Result<CharacterView, ClientError> {
        let path = format!("/characters/{}", character_id.0);
        self.call(Method::GET, &path, None::<&()>).await
    }

    // -- Games ------------------------------------------------------------

    pub async fn create_game(&self, request: &NewGame) -> Result<GameId, ClientError> {
        let created: GameCreated = self.call(Method::POST, "/games/new", Some(request)).await?;
        Ok(created.game_id)
    }

    pub async fn games(&self) -> Result<Vec<GameEntry>, ClientError> {
        self.call(Method::GET, "/games", None::<&()>).await
    }

    pub async fn game(&self, game_id: GameId) -> Result<GameEntry, ClientError> {
        let path = format!("/games/{}", game_id.0);
        self.call(Method::GET, &path, None::<&()>).await
    }

    /// Asks once where a game can be joined.
    pub async fn server_info(&self, game_id: GameId) -> Result<Readiness, ClientError> {
        let path = format!("/games/{}/server_info", game_id.0);
        let (status, bytes) = self.execute(self.request(Method::GET, &path, None::<&()>)?).await?;
        if status == StatusCode::ACCEPTED {
            return Ok(Readiness::Pending);
        }
        Ok(Readiness::Ready(self.codec.decode(&bytes)?))
    }

    /// Polls until the game has a server or the budget runs out.
    ///
    /// # Errors
    /// [`ClientError::NotReady`] after `attempts` pending answers; any
    /// other error ends polling immediately.
    pub async fn wait_for_server(&self, game_id: GameId) -> Result<ServerInfo, ClientError> {
        let PollConfig { attempts, delay } = self.poll;
        for attempt in 1..=attempts {
            if let Readiness::Ready(info) = self.server_info(game_id).await? {
                tracing::debug!(%game_id, attempt, "game server ready");
                return Ok(info);
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }
        Err(ClientError::NotReady { game_id, attempts })
    }

    // -- Machines ---------------------------------------------------------

    pub async fn register_machine(&self, port: u16) -> Result<MachineRegistered, ClientError> {
        self.call(Method::POST, "/machines/register", Some(&RegisterMachine { port }))
            .await
    }

    pub async fn heartbeat(&self, status: &MachineStatus) -> Result<(), ClientError> {
        self.call_unit(Method::POST, "/machines/status", status).await
    }

    pub async fn unregister_machine(
        &self,
        machine_id: MachineId,
        machine_token: &str,
    ) -> Result<(), ClientError> {
        let path = format!("/machines/{}/disconnect", machine_id.0);
        let body = UnregisterMachine {
            machine_token: machine_token.to_owned(),
        };
        self.call_unit(Method::POST, &path, &body).await
    }

    /// Same as [`unregister_machine`](Self::unregister_machine), as `DELETE /machines/{id}`.
    pub async fn delete_machine(
        &self,
        machine_id: MachineId,
        machine_token: &str,
    ) -> Result<(), ClientError> {
        let path = format!("/machines/{}", machine_id.0);
        let body = UnregisterMachine {
            machine_token: machine_token.to_owned(),
        };
        self.call_unit(Method::DELETE, &path, &body).await
    }

    pub async fn machines(&self) -> Result<Vec<MachineEntry>, ClientError> {
        self.call(Method::GET, "/machines", None::<&()>).await
    }

    pub async fn register_server(
        &self,
        game_id: GameId,
        request: &RegisterGameServer,
    ) -> Result<(), ClientError> {
        let path = format!("/games/{}/register_server", game_id.0);
        self.call_unit(Method::POST, &path, request).await
    }

    pub async fn update_position(
        &self,
        character_id: CharacterId,
        machine_token: &str,
        position: Vector3,
    ) -> Result<(), ClientError> {
        let path = format!("/characters/{}/position", character_id.0);
        let body = UpdatePosition {
            machine_token: machine_token.to_owned(),
            position,
        };
        self.call_unit(Method::POST, &path, &body).await
    }

    // -- Plumbing ---------------------------------------------------------

    fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<RequestBuilder, ClientError> {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req
                .header(CONTENT_TYPE, self.codec.content_type())
                .body(self.codec.encode(body)?);
        }
        Ok(req)
    }

    /// Sends a request; non-2xx answers become [`ClientError::Api`].
    async fn execute(&self, req: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?.to_vec();
        if status.is_success() {
            return Ok((status, bytes));
        }

        let err = match self.codec.decode::<ErrorBody>(&bytes) {
            Ok(body) => ClientError::Api {
                status: status.as_u16(),
                kind: Some(body.error),
                message: body.message,
            },
            Err(_) => ClientError::Api {
                status: status.as_u16(),
                kind: None,
                message: String::from_utf8_lossy(&bytes).into_owned(),
            },
        };
        tracing::debug!(%status, error = %err, "master rejected request");
        Err(err)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let (_, bytes) = self.execute(self.request(method, path, body)?).await?;
        Ok(self.codec.decode(&bytes)?)
    }

    async fn call_unit<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        self.execute(self.request(method, path, Some(body))?)
            .await
            .map(drop)
    }
}
