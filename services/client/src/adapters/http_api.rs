//! services/client/src/adapters/http_api.rs
//!
//! This module contains the adapter for the remote Finance Empire HTTP API.
//! It implements the `GameApiService` port from the `core` crate using `reqwest`.

use async_trait::async_trait;
use finance_empire_core::domain::{
    AuthPayload, GameData, LeaderboardEntry, LoginRequest, RegisterRequest, SaveRequest, User,
    UserPosition,
};
use finance_empire_core::ports::{GameApiService, PortError, PortResult};
use reqwest::{header, Client, Method, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `GameApiService` port over HTTP + JSON.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: Client,
    base_url: String,
}

/// Shape of the API's error bodies, e.g. `{"error": "Пользователь уже существует"}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpApiAdapter {
    /// Creates a new `HttpApiAdapter` for the given base URL (e.g. `http://host:3000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Performs one API call and returns the successful response.
    ///
    /// Non-2xx answers become `PortError::Rejected`, carrying the body's `error`
    /// field when the body is JSON. Failing to reach the server is `Transport`.
    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> PortResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%method, %url, authenticated = token.is_some(), "api request");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // A body we cannot read or parse still counts as a rejection, just without a message.
        let message = response
            .bytes()
            .await
            .ok()
            .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok())
            .and_then(|body| body.error);
        debug!(status = status.as_u16(), ?message, "api request rejected");

        Err(PortError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Performs one API call and decodes the JSON payload.
    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, token, body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| PortError::Decode(e.to_string()))
    }
}

//=========================================================================================
// `GameApiService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GameApiService for HttpApiAdapter {
    async fn register(&self, request: &RegisterRequest) -> PortResult<AuthPayload> {
        self.call(Method::POST, "register", None, Some(request)).await
    }

    async fn login(&self, request: &LoginRequest) -> PortResult<AuthPayload> {
        self.call(Method::POST, "login", None, Some(request)).await
    }

    async fn fetch_user(&self, token: &str) -> PortResult<User> {
        self.call::<(), _>(Method::GET, "user", Some(token), None).await
    }

    async fn save_game(&self, token: &str, game_data: &GameData) -> PortResult<()> {
        // Only the status matters; the body of a successful save is ignored.
        let body = SaveRequest { game_data };
        self.send(Method::POST, "save", Some(token), Some(&body))
            .await
            .map(|_| ())
    }

    async fn leaderboard(&self, limit: usize) -> PortResult<Vec<LeaderboardEntry>> {
        let path = format!("leaderboard?limit={}", limit);
        self.call::<(), _>(Method::GET, &path, None, None).await
    }

    async fn leaderboard_top(&self) -> PortResult<Vec<LeaderboardEntry>> {
        self.call::<(), _>(Method::GET, "leaderboard/top", None, None).await
    }

    async fn leaderboard_position(&self, token: &str) -> PortResult<UserPosition> {
        self.call::<(), _>(Method::GET, "leaderboard/position", Some(token), None)
            .await
    }
}
