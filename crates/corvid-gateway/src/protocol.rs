//! Gateway wire protocol: opcodes, close codes, and payload builders.
//!
//! Implements the envelope of the Discord Gateway v10 protocol. Dispatch
//! event payloads are carried as opaque `serde_json::Value` and decoded
//! by `corvid_core::Event::from_dispatch`.

use corvid_core::Intents;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

// ── Opcodes ──────────────────────────────────────────────────

/// Gateway opcodes.
pub(crate) mod opcode {
    /// Event dispatch (receive only).
    pub(crate) const DISPATCH: u8 = 0;
    /// Heartbeat (bidirectional).
    pub(crate) const HEARTBEAT: u8 = 1;
    /// Identify (send only).
    pub(crate) const IDENTIFY: u8 = 2;
    /// Resume (send only).
    pub(crate) const RESUME: u8 = 6;
    /// Server requests reconnect (receive only).
    pub(crate) const RECONNECT: u8 = 7;
    /// Invalid session (receive only).
    pub(crate) const INVALID_SESSION: u8 = 9;
    /// Hello - contains the heartbeat interval (receive only).
    pub(crate) const HELLO: u8 = 10;
    /// Heartbeat ACK (receive only).
    pub(crate) const HEARTBEAT_ACK: u8 = 11;
}

/// Close codes that end the session for good.
pub(crate) mod close_code {
    /// Authentication failed - bad token.
    pub(crate) const AUTHENTICATION_FAILED: u16 = 4004;
    /// Invalid shard configuration.
    pub(crate) const INVALID_SHARD: u16 = 4010;
    /// Invalid intents value.
    pub(crate) const INVALID_INTENTS: u16 = 4013;
    /// Disallowed intents (not enabled in the developer portal).
    pub(crate) const DISALLOWED_INTENTS: u16 = 4014;
}

/// Map a close code to a fatal error, or `None` when reconnecting is
/// still worth trying.
pub(crate) fn fatal_close(code: u16) -> Option<GatewayError> {
    match code {
        close_code::AUTHENTICATION_FAILED => Some(GatewayError::AuthenticationFailed),
        close_code::INVALID_INTENTS | close_code::DISALLOWED_INTENTS => {
            Some(GatewayError::InvalidIntents(code))
        },
        close_code::INVALID_SHARD => Some(GatewayError::UnrecoverableClose(code)),
        _ => None,
    }
}

// ── Wire Types ───────────────────────────────────────────────

/// Raw Gateway payload envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GatewayPayload {
    /// Opcode.
    pub op: u8,
    /// Opcode-dependent data.
    #[serde(default)]
    pub d: Option<serde_json::Value>,
    /// Sequence number (dispatch events only).
    #[serde(default)]
    pub s: Option<u64>,
    /// Event name (dispatch events only).
    #[serde(default)]
    pub t: Option<String>,
}

/// Hello payload (`op=10`).
#[derive(Debug, Deserialize)]
pub(crate) struct Hello {
    /// Heartbeat interval in milliseconds.
    pub heartbeat_interval: u64,
}

// ── Payload Builders ─────────────────────────────────────────

/// Build an Identify payload (`op=2`) requesting the given intents.
pub(crate) fn identify(token: &str, intents: Intents) -> GatewayPayload {
    GatewayPayload {
        op: opcode::IDENTIFY,
        d: Some(serde_json::json!({
            "token": token,
            "intents": intents.bits(),
            "properties": {
                "os": std::env::consts::OS,
                "browser": "corvid",
                "device": "corvid",
            },
        })),
        s: None,
        t: None,
    }
}

/// Build a Resume payload (`op=6`).
pub(crate) fn resume(token: &str, session_id: &str, sequence: u64) -> GatewayPayload {
    GatewayPayload {
        op: opcode::RESUME,
        d: Some(serde_json::json!({
            "token": token,
            "session_id": session_id,
            "seq": sequence,
        })),
        s: None,
        t: None,
    }
}

/// Build a Heartbeat payload (`op=1`) echoing the last sequence.
pub(crate) fn heartbeat(sequence: Option<u64>) -> GatewayPayload {
    GatewayPayload {
        op: opcode::HEARTBEAT,
        d: sequence.map(serde_json::Value::from),
        s: None,
        t: None,
    }
}

// ── Resume URL Validation ────────────────────────────────────

/// Domains a resume gateway URL may point at.
const ALLOWED_RESUME_DOMAINS: &[&str] = &["discord.gg"];

/// Validate that a resume gateway URL is `wss://` on an allowed domain.
pub(crate) fn is_valid_resume_url(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("wss://") else {
        return false;
    };
    let host = rest
        .split('/')
        .next()
        .and_then(|h| h.split('?').next())
        .and_then(|h| h.split(':').next())
        .unwrap_or("");
    ALLOWED_RESUME_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}
