//! Shared context handed to every module during registration.

use corvid_gateway::RestClient;

/// Capabilities available to modules at registration time.
///
/// The same context instance is handed to every module on both
/// registration passes. It is cheap to clone; handlers that need the
/// REST client capture a clone of it.
#[derive(Debug, Clone)]
pub struct BotContext {
    client: RestClient,
}

impl BotContext {
    /// Build a context around an authenticated REST client.
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// The bot's authenticated REST client.
    #[must_use]
    pub fn client(&self) -> &RestClient {
        &self.client
    }
}
