//! Corvid Bot - two-phase module registration, intent inference, and the
//! bootstrap lifecycle.
//!
//! This crate provides:
//! - The [`EventSink`] subscription surface modules are written against
//! - The dry-run [`IntentRecorder`] and the live [`EventDispatcher`],
//!   the two implementations of that surface
//! - The [`BotBase`] module registry with its built-in lifecycle logger
//! - The [`bot`] bootstrap entry point
//!
//! # Two-phase registration
//!
//! Every module is registered twice per bootstrap. The first pass runs
//! against the [`IntentRecorder`], which only observes which event
//! categories are touched; the recorded categories reduce to the minimal
//! Gateway intent mask. The second pass runs against the real
//! [`EventDispatcher`], binding callbacks for dispatch. Modules must
//! subscribe to the same categories on both passes; the framework does
//! not detect divergence.
//!
//! # Example
//!
//! ```rust,no_run
//! use corvid_bot::prelude::*;
//!
//! # async fn example() -> BotResult<()> {
//! bot("discord-bot-token", |base| {
//!     base.register_module(|sink: &mut dyn EventSink, _ctx: &BotContext| {
//!         sink.on_message_create(handler(|message: std::sync::Arc<Message>| async move {
//!             tracing::info!(channel = %message.channel_id, "saw a message");
//!         }));
//!     });
//! })
//! .await
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod bot;
mod context;
mod dispatcher;
mod error;
mod module;
mod recorder;
mod sink;

pub use bot::{bot, run_lifecycle};
pub use context::BotContext;
pub use dispatcher::EventDispatcher;
pub use error::{BotError, BotResult};
pub use module::{BotBase, BotModule};
pub use recorder::IntentRecorder;
pub use sink::{EventSink, Handler, handler};

// Re-export the model and transport types modules interact with.
pub use corvid_core::{Event, EventKind, Intents};
pub use corvid_gateway::{Connection, Gateway, GatewayConfig, RestClient};
