//! Exercises the HTTP adapter and the controller against an in-process fake
//! of the game API.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use client_lib::{
    adapters::{HttpApiAdapter, MemoryStore, SystemClock},
    app::{AppController, AppState},
    config::Config,
    messages::Locale,
};
use finance_empire_core::domain::{GameData, LoginRequest, RegisterRequest};
use finance_empire_core::ports::{GameApiService, PortError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct Recorded {
    saves: Mutex<Vec<Value>>,
    limits: Mutex<Vec<String>>,
}

type Shared = State<Arc<Recorded>>;

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn alice() -> Value {
    json!({ "id": "u1", "username": "alice", "gameData": { "money": 100 } })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "alice" && body["password"] == "pw" {
        Json(json!({ "token": "T1", "user": alice() })).into_response()
    } else {
        rejected(StatusCode::UNAUTHORIZED, "Неверное имя пользователя или пароль")
    }
}

async fn register(Json(_body): Json<Value>) -> Response {
    rejected(StatusCode::BAD_REQUEST, "Пользователь уже существует")
}

async fn user(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some("T1") => Json(alice()).into_response(),
        _ => rejected(StatusCode::UNAUTHORIZED, "Недействительный токен"),
    }
}

async fn save(State(recorded): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers) != Some("T1") {
        return rejected(StatusCode::UNAUTHORIZED, "Недействительный токен");
    }
    recorded.saves.lock().unwrap().push(body);
    Json(json!({ "success": true })).into_response()
}

async fn leaderboard(
    State(recorded): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(limit) = params.get("limit") {
        recorded.limits.lock().unwrap().push(limit.clone());
    }
    Json(json!([
        { "userId": "u7", "username": "whale", "prestigeLevel": 9, "prestigePoints": 140.5, "totalMoney": 1.5e12 },
        { "userId": "u8", "username": "shark", "prestigeLevel": 4 }
    ]))
    .into_response()
}

async fn top() -> &'static str {
    "<html>maintenance</html>"
}

async fn position(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some("T1") => Json(json!({ "position": null, "totalPlayers": 900 })).into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn spawn_server() -> (String, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());
    let api = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/user", get(user))
        .route("/save", post(save))
        .route("/leaderboard", get(leaderboard))
        .route("/leaderboard/top", get(top))
        .route("/leaderboard/position", get(position));
    let app = Router::new().nest("/api", api).with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), recorded)
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let (base, _) = spawn_server().await;
    let adapter = HttpApiAdapter::new(base).unwrap();

    let payload = adapter
        .login(&LoginRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(payload.token, "T1");
    assert_eq!(payload.user.id, "u1");
    assert_eq!(payload.user.game_data, GameData::new(json!({ "money": 100 })));

    let user = adapter.fetch_user("T1").await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn rejections_carry_the_server_message() {
    let (base, _) = spawn_server().await;
    let adapter = HttpApiAdapter::new(base).unwrap();

    let err = adapter
        .register(&RegisterRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
            email: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PortError::Rejected {
            status: 400,
            message: Some("Пользователь уже существует".to_string()),
        }
    );

    let err = adapter.fetch_user("stale").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Недействительный токен"));
}

#[tokio::test]
async fn rejection_without_body_has_no_message() {
    let (base, _) = spawn_server().await;
    let adapter = HttpApiAdapter::new(base).unwrap();

    let err = adapter.leaderboard_position("stale").await.unwrap_err();
    assert_eq!(
        err,
        PortError::Rejected {
            status: 401,
            message: None,
        }
    );

    let position = adapter.leaderboard_position("T1").await.unwrap();
    assert_eq!(position.position, None);
    assert_eq!(position.total_players, Some(900));
}

#[tokio::test]
async fn save_sends_bearer_and_game_data() {
    let (base, recorded) = spawn_server().await;
    let adapter = HttpApiAdapter::new(base).unwrap();

    let game_data = GameData::new(json!({ "money": 500, "upgrades": { "stall": 2 } }));
    adapter.save_game("T1", &game_data).await.unwrap();
    assert_eq!(
        recorded.saves.lock().unwrap().as_slice(),
        &[json!({ "gameData": { "money": 500, "upgrades": { "stall": 2 } } })]
    );

    let err = adapter.save_game("stale", &game_data).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(recorded.saves.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn leaderboard_passes_limit_and_fills_defaults() {
    let (base, recorded) = spawn_server().await;
    let adapter = HttpApiAdapter::new(base).unwrap();

    let entries = adapter.leaderboard(25).await.unwrap();
    assert_eq!(recorded.limits.lock().unwrap().as_slice(), &["25".to_string()]);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].prestige_level, 9);
    assert_eq!(entries[1].prestige_points, 0.0);
    assert_eq!(entries[1].total_money, 0.0);
}

#[tokio::test]
async fn non_json_success_is_a_decode_failure() {
    let (base, _) = spawn_server().await;
    let adapter = HttpApiAdapter::new(base).unwrap();

    let err = adapter.leaderboard_top().await.unwrap_err();
    assert!(matches!(err, PortError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn controller_logs_in_saves_and_shows_standing() {
    let (base, recorded) = spawn_server().await;
    let store = Arc::new(MemoryStore::new());
    let (controller, _notifications) = AppController::new(AppState {
        api: Arc::new(HttpApiAdapter::new(base).unwrap()),
        store: store.clone(),
        clock: Arc::new(SystemClock),
        config: Arc::new(Config::from_lookup(|_| None).unwrap()),
    });

    controller.login("alice", "pw").await.unwrap();
    assert_eq!(store.len(), 2);

    controller.update_game_state(|data| data.0["money"] = json!(900));
    assert!(controller.page_exit().await);
    assert_eq!(
        recorded.saves.lock().unwrap().last(),
        Some(&json!({ "gameData": { "money": 900 } }))
    );

    let view = controller.open_leaderboard().await.unwrap();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(
        recorded.limits.lock().unwrap().as_slice(),
        &["100".to_string()]
    );
    let standing = view.own_standing.unwrap();
    assert_eq!(standing.describe(Locale::Ru), "Позиция неизвестна");

    controller.logout();
    assert!(store.is_empty());
    controller.shutdown();
}
