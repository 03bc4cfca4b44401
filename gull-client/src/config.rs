//! Client configuration

use std::time::Duration;

/// Client configuration for connecting to the restaurant backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// JWT token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds.
    ///
    /// Kept below the shortest poll interval so a hung request cannot
    /// starve the next scheduled tick.
    pub timeout: u64,

    /// Refresh interval for a session's message log
    pub message_poll: Duration,

    /// Refresh interval for a session's linked reservations
    pub reservation_poll: Duration,

    /// Refresh interval for the session directory
    pub session_list_poll: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 4,
            message_poll: Duration::from_millis(5000),
            reservation_poll: Duration::from_millis(10000),
            session_list_poll: Duration::from_millis(15000),
        }
    }

    /// Set the JWT token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the message log refresh interval
    pub fn with_message_poll(mut self, interval: Duration) -> Self {
        self.message_poll = interval;
        self
    }

    /// Set the reservation refresh interval
    pub fn with_reservation_poll(mut self, interval: Duration) -> Self {
        self.reservation_poll = interval;
        self
    }

    /// Set the session directory refresh interval
    pub fn with_session_list_poll(mut self, interval: Duration) -> Self {
        self.session_list_poll = interval;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> super::HttpClient {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
