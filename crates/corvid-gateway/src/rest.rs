//! REST API client.
//!
//! One [`RestClient`] is built per bootstrap invocation and shared, by
//! reference, with every module through the bot context. Clones share
//! the underlying connection pool.

use serde::Deserialize;
use tracing::debug;

use crate::error::GatewayResult;

/// Base URL of the Discord REST API.
const API_BASE: &str = "https://discord.com/api/v10";

/// Reusable HTTP client for the Discord REST API.
///
/// Authenticates every request with the bot token supplied at
/// construction. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    token: String,
}

impl RestClient {
    /// Create a client authenticating with the given bot token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Fetch the `WebSocket` URL for opening a realtime connection
    /// (`GET /gateway/bot`).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn get_gateway_bot(&self) -> GatewayResult<GatewayBot> {
        debug!("Fetching gateway URL");
        let response = self
            .http
            .get(format!("{API_BASE}/gateway/bot"))
            .header("Authorization", self.authorization())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Fetch the bot's own user (`GET /users/@me`).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn get_current_user(&self) -> GatewayResult<CurrentUser> {
        let response = self
            .http
            .get(format!("{API_BASE}/users/@me"))
            .header("Authorization", self.authorization())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Post a plain-text message to a channel
    /// (`POST /channels/{id}/messages`).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn create_message(&self, channel_id: &str, content: &str) -> GatewayResult<()> {
        self.http
            .post(format!("{API_BASE}/channels/{channel_id}/messages"))
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Response from `GET /gateway/bot`.
#[derive(Debug, Deserialize)]
pub struct GatewayBot {
    /// Gateway `WebSocket` URL.
    pub url: String,
    /// Recommended shard count.
    #[serde(default)]
    pub shards: u32,
}

/// Response from `GET /users/@me`.
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    /// The bot's user ID.
    pub id: String,
    /// The bot's username.
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_uses_bot_scheme() {
        let client = RestClient::new("abc123");
        assert_eq!(client.authorization(), "Bot abc123");
    }

    #[test]
    fn gateway_bot_response_decodes() {
        let json = serde_json::json!({
            "url": "wss://gateway.discord.gg",
            "shards": 1,
            "session_start_limit": { "total": 1000, "remaining": 999 }
        });
        let response: GatewayBot = serde_json::from_value(json).unwrap();
        assert_eq!(response.url, "wss://gateway.discord.gg");
        assert_eq!(response.shards, 1);
    }
}
