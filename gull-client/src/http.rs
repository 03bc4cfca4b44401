//! HTTP client for network-based API calls
//!
//! Implements [`ChatApi`] over reqwest. Endpoint note: the chat message and
//! reservation reads are served by the legacy chat service and return their
//! payload bare; mutations, auth and the session directory go through the
//! current API and use the [`ApiResponse`] envelope.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::ChatApi;
use crate::{ClientConfig, ClientError, ClientResult};
use shared::client::{
    ApiResponse, LoginRequest, LoginResponse, MessageHistory, ReservationsResponse,
    SendMessageRequest, SessionsResponse, UserInfo,
};
use shared::models::{ChatMessage, ChatSession, Reservation, SessionId};

/// HTTP client for making network requests to the restaurant backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.client.post(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        response.json().await.map_err(Into::into)
    }

    // ========== Auth API ==========

    /// Login with username and password
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        self.post::<ApiResponse<LoginResponse>, _>("api/auth/login", &request)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing login data".to_string()))
    }

    /// Get current user information
    pub async fn me(&self) -> ClientResult<UserInfo> {
        self.get::<ApiResponse<UserInfo>>("api/auth/me")
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing user data".to_string()))
    }

    /// Logout
    pub async fn logout(&mut self) -> ClientResult<()> {
        self.post_empty::<ApiResponse<()>>("api/auth/logout").await?;
        self.token = None;
        Ok(())
    }
}

#[async_trait]
impl ChatApi for HttpClient {
    async fn fetch_messages(&self, session_id: SessionId) -> ClientResult<Vec<ChatMessage>> {
        // Legacy shape tolerance lives entirely in MessageHistory
        self.get::<MessageHistory>(&format!("api/chat/sessions/{}/messages", session_id))
            .await
            .map(MessageHistory::into_messages)
    }

    async fn send_message(
        &self,
        session_id: SessionId,
        content: &str,
    ) -> ClientResult<serde_json::Value> {
        let body = SendMessageRequest {
            content: content.to_string(),
        };

        let response: ApiResponse<serde_json::Value> = self
            .post(&format!("api/chat/sessions/{}/messages", session_id), &body)
            .await?;
        Ok(response.data.unwrap_or(serde_json::Value::Null))
    }

    async fn close_session(&self, session_id: SessionId) -> ClientResult<serde_json::Value> {
        let response: ApiResponse<serde_json::Value> = self
            .post_empty(&format!("api/chat/sessions/{}/close", session_id))
            .await?;
        Ok(response.data.unwrap_or(serde_json::Value::Null))
    }

    async fn fetch_reservations(&self, session_id: SessionId) -> ClientResult<Vec<Reservation>> {
        self.get::<ReservationsResponse>(&format!(
            "api/chat/sessions/{}/reservations",
            session_id
        ))
        .await
        .map(|r| r.reservations)
    }

    async fn fetch_sessions(&self) -> ClientResult<Vec<ChatSession>> {
        self.get::<ApiResponse<SessionsResponse>>("api/chat/sessions")
            .await?
            .data
            .map(|s| s.sessions)
            .ok_or_else(|| ClientError::InvalidResponse("Missing session list".to_string()))
    }
}
