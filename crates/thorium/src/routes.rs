//! HTTP routes and their handlers.
//!
//! Handlers are thin: extract, call into [`Master`], map the outcome.
//! Bodies that fail to parse are rejected by [`ApiJson`] with a 400
//! before any handler runs.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use thorium_fleet::LoadSample;
use thorium_game::ServerPoll;
use thorium_protocol::{
    Authentication, CharacterCreated, CharacterId, CharacterView, CreateCharacter, Disconnect,
    GameCreated, GameEntry, GameId, LoginResponse, MachineEntry, MachineId, MachineRegistered,
    MachineStatus, NewGame, RegisterGameServer, RegisterMachine, UnregisterMachine,
    UpdatePosition,
};
use thorium_session::IdentityStore;
use tower_http::trace::TraceLayer;

use crate::api::ApiJson;
use crate::{ApiError, Master};

type AppState<S> = State<Arc<Master<S>>>;

/// Builds the master's router.
///
/// Machine registration reads the peer address, so the router must be
/// served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router<S: IdentityStore>(master: Arc<Master<S>>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/status", get(status))
        // Players
        .route("/clients/register", post(register_client::<S>))
        .route("/clients/login", post(login_client::<S>))
        .route("/clients/disconnect", post(disconnect_client::<S>))
        .route("/characters/new", post(create_character::<S>))
        .route("/characters/{id}", get(get_character::<S>))
        .route("/characters/{id}/position", post(update_position::<S>))
        // Fleet
        .route("/machines", get(list_machines::<S>))
        .route("/machines/register", post(register_machine::<S>))
        .route("/machines/status", post(machine_status::<S>))
        .route("/machines/{id}", delete(unregister_machine::<S>))
        .route("/machines/{id}/disconnect", post(unregister_machine::<S>))
        // Games
        .route("/games", get(list_games::<S>))
        .route("/games/new", post(create_game::<S>))
        .route("/games/{id}", get(get_game::<S>))
        .route("/games/{id}/register_server", post(register_server::<S>))
        .route("/games/{id}/server_info", get(server_info::<S>))
        .with_state(master)
        .layer(TraceLayer::new_for_http())
}

async fn status() -> &'static str {
    "OK"
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

async fn register_client<S: IdentityStore>(
    State(master): AppState<S>,
    ApiJson(auth): ApiJson<Authentication>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = master.sessions().register(&auth.username, &auth.password).await?;
    Ok(Json(session.into()))
}

async fn login_client<S: IdentityStore>(
    State(master): AppState<S>,
    ApiJson(auth): ApiJson<Authentication>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = master.sessions().login(&auth.username, &auth.password).await?;
    Ok(Json(session.into()))
}

async fn disconnect_client<S: IdentityStore>(
    State(master): AppState<S>,
    ApiJson(body): ApiJson<Disconnect>,
) -> Result<&'static str, ApiError> {
    master.sessions().disconnect(&body.session_key).await?;
    Ok("OK")
}

async fn create_character<S: IdentityStore>(
    State(master): AppState<S>,
    ApiJson(body): ApiJson<CreateCharacter>,
) -> Result<Json<CharacterCreated>, ApiError> {
    let character_id = master
        .characters()
        .create(&body.session_key, &body.name, body.class_id)
        .await?;
    Ok(Json(CharacterCreated { character_id }))
}

async fn get_character<S: IdentityStore>(
    State(master): AppState<S>,
    Path(id): Path<u64>,
) -> Result<Json<CharacterView>, ApiError> {
    let view = master
        .characters()
        .get(CharacterId(id))
        .await
        .map_err(ApiError::lookup)?;
    Ok(Json(view))
}

async fn update_position<S: IdentityStore>(
    State(master): AppState<S>,
    Path(id): Path<u64>,
    ApiJson(body): ApiJson<UpdatePosition>,
) -> Result<&'static str, ApiError> {
    master
        .update_position(CharacterId(id), &body.machine_token, body.position)
        .await?;
    Ok("OK")
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

async fn register_machine<S: IdentityStore>(
    State(master): AppState<S>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ApiJson(body): ApiJson<RegisterMachine>,
) -> Result<Json<MachineRegistered>, ApiError> {
    let (machine_id, machine_token) = master.fleet().register(peer.ip(), body.port).await?;
    Ok(Json(MachineRegistered {
        machine_id,
        machine_token,
    }))
}

async fn machine_status<S: IdentityStore>(
    State(master): AppState<S>,
    ApiJson(body): ApiJson<MachineStatus>,
) -> Result<&'static str, ApiError> {
    let load = LoadSample {
        cpu: body.usage_cpu,
        network: body.usage_network,
        player_capacity: body.player_capacity,
    };
    master.fleet().heartbeat(&body.machine_token, load).await?;
    Ok("OK")
}

async fn unregister_machine<S: IdentityStore>(
    State(master): AppState<S>,
    Path(id): Path<u64>,
    ApiJson(body): ApiJson<UnregisterMachine>,
) -> Result<&'static str, ApiError> {
    master
        .unregister_machine(&body.machine_token, Some(MachineId(id)))
        .await?;
    Ok("OK")
}

async fn list_machines<S: IdentityStore>(State(master): AppState<S>) -> Json<Vec<MachineEntry>> {
    let machines = master.fleet().list().await;
    Json(machines.into_iter().map(MachineEntry::from).collect())
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

async fn create_game<S: IdentityStore>(
    State(master): AppState<S>,
    ApiJson(body): ApiJson<NewGame>,
) -> Result<(StatusCode, Json<GameCreated>), ApiError> {
    let game_id = master.games().create(body).await?;
    Ok((StatusCode::CREATED, Json(GameCreated { game_id })))
}

async fn list_games<S: IdentityStore>(State(master): AppState<S>) -> Json<Vec<GameEntry>> {
    let games = master.games().list().await;
    Json(games.into_iter().map(GameEntry::from).collect())
}

async fn get_game<S: IdentityStore>(
    State(master): AppState<S>,
    Path(id): Path<u64>,
) -> Result<Json<GameEntry>, ApiError> {
    let info = master.games().get(GameId(id)).await.map_err(ApiError::lookup)?;
    Ok(Json(info.into()))
}

async fn register_server<S: IdentityStore>(
    State(master): AppState<S>,
    Path(id): Path<u64>,
    ApiJson(body): ApiJson<RegisterGameServer>,
) -> Result<&'static str, ApiError> {
    master.register_server(GameId(id), body).await?;
    Ok("OK")
}

/// 200 with the address once hosted, 202 while pending.
async fn server_info<S: IdentityStore>(
    State(master): AppState<S>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let poll = master
        .games()
        .server_info(GameId(id))
        .await
        .map_err(ApiError::lookup)?;
    Ok(match poll {
        ServerPoll::Pending => StatusCode::ACCEPTED.into_response(),
        ServerPoll::Ready(info) => Json(info).into_response(),
    })
}
