//! Bootstrap error taxonomy.

use thiserror::Error;

/// Everything that can fail while bootstrapping or running a bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// The Gateway connection failed to establish or run.
    #[error("Gateway error: {0}")]
    Gateway(#[from] corvid_gateway::GatewayError),
}

/// Convenience alias for bootstrap results.
pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_gateway::GatewayError;

    #[test]
    fn gateway_errors_convert() {
        let err: BotError = GatewayError::NotStarted.into();
        assert!(matches!(err, BotError::Gateway(GatewayError::NotStarted)));
    }
}
