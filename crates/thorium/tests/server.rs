//! Integration tests for the Thorium master: a real server on a loopback
//! port, driven through `thorium-client`.

use std::time::Duration;

use thorium::prelude::*;
use thorium_client::{ClientError, MasterClient, PollConfig, Readiness};
use thorium_protocol::{
    CharacterId, ClassId, ErrorBody, GameStatus, MachineStatus, NewGame, RegisterGameServer, Vector3,
};
use tokio::sync::oneshot;

// =========================================================================
// Helpers
// =========================================================================

/// A running master plus a client pointed at it. Dropping it stops the server.
struct TestMaster {
    client: MasterClient,
    _shutdown: oneshot::Sender<()>,
}

async fn start_master() -> TestMaster {
    let server = ThoriumServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(MemoryStore::new())
        .await
        .expect("should bind");
    let addr = server.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));

    let client = MasterClient::new(format!("http://{addr}")).poll_config(PollConfig {
        attempts: 10,
        delay: Duration::from_millis(20),
    });
    TestMaster {
        client,
        _shutdown: tx,
    }
}

fn sandbox() -> NewGame {
    NewGame {
        map: "Map_Sandbox".into(),
        mode: "Tutorial".into(),
        minimum_level: 1,
        max_players: 16,
    }
}

fn assert_api(err: ClientError, status: u16, kind: ErrorKind) {
    assert_eq!(err.status(), Some(status), "unexpected error: {err}");
    assert_eq!(err.kind(), Some(kind), "unexpected error: {err}");
}

// =========================================================================
// Status
// =========================================================================

#[tokio::test]
async fn test_status_returns_ok() {
    let master = start_master().await;

    master.client.status().await.expect("master should be up");
}

// =========================================================================
// Sessions
// =========================================================================

#[tokio::test]
async fn test_register_then_duplicate_returns_already_in_use() {
    let master = start_master().await;

    let session = master.client.register("alice", "pw").await.unwrap();
    let dup = master.client.register("alice", "pw").await.unwrap_err();

    assert_eq!(session.session_key.len(), 32);
    assert!(session.character_ids.is_empty());
    assert_api(dup, 400, ErrorKind::AlreadyInUse);
}

#[tokio::test]
async fn test_login_failures_stay_distinct() {
    let master = start_master().await;
    let session = master.client.register("alice", "pw").await.unwrap();

    let active = master.client.login("alice", "pw").await.unwrap_err();
    master.client.disconnect(&session.session_key).await.unwrap();
    let missing = master.client.login("bob", "pw").await.unwrap_err();
    let wrong = master.client.login("alice", "nope").await.unwrap_err();

    assert_api(active, 400, ErrorKind::AlreadyActive);
    assert_api(missing, 400, ErrorKind::NotFound);
    assert_api(wrong, 400, ErrorKind::InvalidCredential);
}

#[tokio::test]
async fn test_disconnect_twice_returns_invalid_session() {
    let master = start_master().await;
    let session = master.client.register("alice", "pw").await.unwrap();

    master.client.disconnect(&session.session_key).await.unwrap();
    let second = master.client.disconnect(&session.session_key).await.unwrap_err();

    assert_api(second, 400, ErrorKind::InvalidSession);
}

#[tokio::test]
async fn test_register_empty_password_returns_invalid_argument() {
    let master = start_master().await;

    let err = master.client.register("alice", "").await.unwrap_err();

    assert_api(err, 400, ErrorKind::InvalidArgument);
}

// =========================================================================
// Characters
// =========================================================================

#[tokio::test]
async fn test_character_create_and_fetch() {
    let master = start_master().await;
    let session = master.client.register("alice", "pw").await.unwrap();

    let id = master
        .client
        .create_character(&session.session_key, "Hero", ClassId(2))
        .await
        .unwrap();
    let view = master.client.character(id).await.unwrap();

    assert!(!id.is_unset());
    assert_eq!(view.name, "Hero");
    assert_eq!(view.class_id, ClassId(2));
    assert_eq!(view.position, Vector3::ZERO);
}

#[tokio::test]
async fn test_character_with_bad_session_returns_invalid_session() {
    let master = start_master().await;

    let err = master
        .client
        .create_character("bogus", "Hero", ClassId(1))
        .await
        .unwrap_err();

    assert_api(err, 400, ErrorKind::InvalidSession);
}

#[tokio::test]
async fn test_character_unknown_id_returns_404() {
    let master = start_master().await;

    let err = master.client.character(CharacterId(404)).await.unwrap_err();

    assert_api(err, 404, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_character_position_written_by_machine() {
    let master = start_master().await;
    let session = master.client.register("alice", "pw").await.unwrap();
    let id = master
        .client
        .create_character(&session.session_key, "Hero", ClassId(2))
        .await
        .unwrap();
    let machine = master.client.register_machine(9000).await.unwrap();

    master
        .client
        .update_position(id, &machine.machine_token, Vector3::new(1.0, 2.0, 3.0))
        .await
        .unwrap();
    let rejected = master
        .client
        .update_position(id, "not-a-machine", Vector3::ZERO)
        .await
        .unwrap_err();

    assert_eq!(
        master.client.character(id).await.unwrap().position,
        Vector3::new(1.0, 2.0, 3.0)
    );
    assert_api(rejected, 400, ErrorKind::InvalidToken);
}

// =========================================================================
// Fleet
// =========================================================================

#[tokio::test]
async fn test_register_machine_without_port_returns_invalid_argument() {
    let master = start_master().await;

    let err = master.client.register_machine(0).await.unwrap_err();

    assert_api(err, 400, ErrorKind::InvalidArgument);
    assert!(master.client.machines().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_heartbeat_unknown_token_returns_invalid_token() {
    let master = start_master().await;
    master.client.register_machine(9000).await.unwrap();

    let err = master
        .client
        .heartbeat(&MachineStatus {
            machine_token: "unknown".into(),
            usage_cpu: 0.9,
            usage_network: 0.9,
            player_capacity: 0,
        })
        .await
        .unwrap_err();

    assert_api(err, 400, ErrorKind::InvalidToken);
    let machines = master.client.machines().await.unwrap();
    assert_eq!(machines[0].usage_cpu, 0.0, "rejected heartbeat must not mutate");
}

#[tokio::test]
async fn test_machine_address_comes_from_connection() {
    let master = start_master().await;

    let machine = master.client.register_machine(9000).await.unwrap();
    master
        .client
        .heartbeat(&MachineStatus {
            machine_token: machine.machine_token.clone(),
            usage_cpu: 0.4,
            usage_network: 0.1,
            player_capacity: 32,
        })
        .await
        .unwrap();
    let machines = master.client.machines().await.unwrap();

    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0].machine_id, machine.machine_id);
    assert_eq!(machines[0].address, "127.0.0.1");
    assert_eq!(machines[0].port, 9000);
    assert_eq!(machines[0].player_capacity, 32);
}

#[tokio::test]
async fn test_delete_machine_with_wrong_path_id_returns_invalid_token() {
    let master = start_master().await;
    let machine = master.client.register_machine(9000).await.unwrap();

    let err = master
        .client
        .delete_machine(MachineId(machine.machine_id.0 + 1), &machine.machine_token)
        .await
        .unwrap_err();
    master
        .client
        .delete_machine(machine.machine_id, &machine.machine_token)
        .await
        .unwrap();

    assert_api(err, 400, ErrorKind::InvalidToken);
    assert!(master.client.machines().await.unwrap().is_empty());
}

// =========================================================================
// Games
// =========================================================================

#[tokio::test]
async fn test_sandbox_game_pending_until_machine_registers() {
    let master = start_master().await;

    let game_id = master.client.create_game(&sandbox()).await.unwrap();
    assert!(!game_id.is_unset());
    assert_eq!(
        master.client.server_info(game_id).await.unwrap(),
        Readiness::Pending
    );

    let machine = master.client.register_machine(9000).await.unwrap();
    master
        .client
        .register_server(
            game_id,
            &RegisterGameServer {
                machine_id: machine.machine_id,
                machine_token: machine.machine_token.clone(),
                port: 7777,
            },
        )
        .await
        .unwrap();

    let info = master.client.wait_for_server(game_id).await.unwrap();
    assert_eq!(info.remote_address, "127.0.0.1");
    assert_eq!(info.port, 7777);
    assert_eq!(
        master.client.game(game_id).await.unwrap().status,
        GameStatus::Registered
    );
}

#[tokio::test]
async fn test_wait_for_server_sees_late_registration() {
    let master = start_master().await;
    let game_id = master.client.create_game(&sandbox()).await.unwrap();
    let machine = master.client.register_machine(9000).await.unwrap();

    let host = {
        let client = master.client.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            client
                .register_server(
                    game_id,
                    &RegisterGameServer {
                        machine_id: machine.machine_id,
                        machine_token: machine.machine_token,
                        port: 7777,
                    },
                )
                .await
        })
    };

    let info = master.client.wait_for_server(game_id).await.unwrap();
    host.await.unwrap().unwrap();

    assert_eq!(info.port, 7777);
}

#[tokio::test]
async fn test_wait_for_server_gives_up_after_budget() {
    let master = start_master().await;
    let game_id = master.client.create_game(&sandbox()).await.unwrap();
    let client = master.client.clone().poll_config(PollConfig {
        attempts: 3,
        delay: Duration::from_millis(5),
    });

    let err = client.wait_for_server(game_id).await.unwrap_err();

    assert!(matches!(err, ClientError::NotReady { attempts: 3, .. }));
}

#[tokio::test]
async fn test_register_server_twice_returns_conflict() {
    let master = start_master().await;
    let game_id = master.client.create_game(&sandbox()).await.unwrap();
    let first = master.client.register_machine(9000).await.unwrap();
    let second = master.client.register_machine(9001).await.unwrap();
    let claim = |m: &thorium_protocol::MachineRegistered, port| RegisterGameServer {
        machine_id: m.machine_id,
        machine_token: m.machine_token.clone(),
        port,
    };

    master.client.register_server(game_id, &claim(&first, 7777)).await.unwrap();
    let err = master
        .client
        .register_server(game_id, &claim(&second, 8888))
        .await
        .unwrap_err();

    assert_api(err, 409, ErrorKind::Conflict);
    assert_eq!(master.client.wait_for_server(game_id).await.unwrap().port, 7777);
}

#[tokio::test]
async fn test_register_server_validation_errors() {
    let master = start_master().await;
    let game_id = master.client.create_game(&sandbox()).await.unwrap();
    let machine = master.client.register_machine(9000).await.unwrap();
    let claim = |game, port| {
        let request = RegisterGameServer {
            machine_id: machine.machine_id,
            machine_token: machine.machine_token.clone(),
            port,
        };
        let client = master.client.clone();
        async move { client.register_server(game, &request).await.unwrap_err() }
    };

    assert_api(claim(game_id, 0).await, 400, ErrorKind::InvalidArgument);
    assert_api(claim(GameId(999), 7777).await, 400, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_server_info_unknown_game_returns_404() {
    let master = start_master().await;

    let err = master.client.server_info(GameId(12345)).await.unwrap_err();

    assert_api(err, 404, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_game_without_map_returns_invalid_argument() {
    let master = start_master().await;
    let request = NewGame {
        map: String::new(),
        ..sandbox()
    };

    let err = master.client.create_game(&request).await.unwrap_err();

    assert_api(err, 400, ErrorKind::InvalidArgument);
    assert!(master.client.games().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unregistered_host_makes_game_unavailable() {
    let master = start_master().await;
    let game_id = master.client.create_game(&sandbox()).await.unwrap();
    let machine = master.client.register_machine(9000).await.unwrap();
    master
        .client
        .register_server(
            game_id,
            &RegisterGameServer {
                machine_id: machine.machine_id,
                machine_token: machine.machine_token.clone(),
                port: 7777,
            },
        )
        .await
        .unwrap();

    master
        .client
        .unregister_machine(machine.machine_id, &machine.machine_token)
        .await
        .unwrap();

    let err = master.client.server_info(game_id).await.unwrap_err();
    assert_api(err, 404, ErrorKind::NotFound);
    let games = master.client.games().await.unwrap();
    assert_eq!(games[0].status, GameStatus::Unavailable);
}

// =========================================================================
// Malformed bodies
// =========================================================================

/// Posts `body` verbatim and decodes the error answer.
async fn post_raw(
    master: &TestMaster,
    path: &str,
    body: &str,
    json: bool,
) -> (u16, ErrorBody) {
    let mut req = reqwest::Client::new()
        .post(format!("{}{}", master.client.base_url(), path))
        .body(body.to_owned());
    if json {
        req = req.header("content-type", "application/json");
    }
    let resp = req.send().await.expect("master should answer");
    let status = resp.status().as_u16();
    let bytes = resp.bytes().await.expect("should read body");
    let body = serde_json::from_slice(&bytes).expect("error body should be JSON");
    (status, body)
}

#[tokio::test]
async fn test_heartbeat_empty_body_returns_invalid_token() {
    let master = start_master().await;

    let (status, body) = post_raw(&master, "/machines/status", "{}", true).await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidToken);
}

#[tokio::test]
async fn test_disconnect_empty_body_returns_invalid_session() {
    let master = start_master().await;

    let (status, body) = post_raw(&master, "/clients/disconnect", "{}", true).await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidSession);
}

#[tokio::test]
async fn test_unregister_machine_empty_body_returns_invalid_token() {
    let master = start_master().await;

    let (status, body) = post_raw(&master, "/machines/1/disconnect", "{}", true).await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidToken);
}

#[tokio::test]
async fn test_login_without_content_type_returns_invalid_argument() {
    let master = start_master().await;

    let (status, body) = post_raw(
        &master,
        "/clients/login",
        r#"{"username":"alice","password":"pw"}"#,
        false,
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_create_character_without_class_returns_invalid_argument() {
    let master = start_master().await;
    let session = master.client.register("alice", "pw").await.unwrap();
    let body = format!(r#"{{"sessionKey":"{}","name":"Hero"}}"#, session.session_key);

    let (status, body) = post_raw(&master, "/characters/new", &body, true).await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_register_machine_out_of_range_port_returns_invalid_argument() {
    let master = start_master().await;

    let (status, body) = post_raw(&master, "/machines/register", r#"{"port":70000}"#, true).await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidArgument);
    assert!(master.client.machines().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_game_not_json_returns_invalid_argument() {
    let master = start_master().await;

    let (status, body) = post_raw(&master, "/games/new", "map=Map_Sandbox", true).await;

    assert_eq!(status, 400);
    assert_eq!(body.error, ErrorKind::InvalidArgument);
}
