//! Corvid Gateway - transport collaborators for the bot bootstrap.
//!
//! This crate provides the two platform transports the bootstrap wires
//! together:
//! - [`RestClient`] — reusable HTTP client for the Discord REST API
//! - [`Gateway`] — the realtime `WebSocket` connection, with the
//!   hello/identify handshake, heartbeating, and resume/reconnect
//!   handling owned entirely by this collaborator
//!
//! # Lifecycle
//!
//! A [`Gateway`] moves through `start` → `run` → `stop`, exactly once
//! each, expressed by the [`Connection`] trait. `start` establishes the
//! realtime session or fails fatally; `run` blocks until the connection
//! ends or a [`ShutdownHandle`] fires; `stop` releases resources and is
//! an idempotent no-op on a never-started connection.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod connection;
mod error;
mod gateway;
mod heartbeat;
pub(crate) mod protocol;
mod reconnect;
mod rest;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{Connection, Gateway, GatewayConfig, ShutdownHandle};
pub use rest::{CurrentUser, GatewayBot, RestClient};
