//! One-stop import for bot authors.
//!
//! ```rust
//! use corvid_bot::prelude::*;
//! ```

pub use crate::bot::{bot, run_lifecycle};
pub use crate::context::BotContext;
pub use crate::dispatcher::EventDispatcher;
pub use crate::error::{BotError, BotResult};
pub use crate::module::{BotBase, BotModule};
pub use crate::recorder::IntentRecorder;
pub use crate::sink::{EventSink, Handler, handler};

pub use corvid_core::{
    Channel, Event, EventKind, Guild, Intents, MemberAdd, MemberRemove, Message, MessageDelete,
    Presence, Reaction, Ready, TypingStart, User,
};
pub use corvid_gateway::{Connection, Gateway, GatewayConfig, RestClient};
