//! Corvid Core - Discord event model and Gateway intents.
//!
//! This crate provides:
//! - The event categories a bot can subscribe to ([`EventKind`])
//! - Typed dispatch events and their payloads ([`Event`])
//! - The Gateway intent bitmask ([`Intents`]) and the fixed
//!   category-to-intent table ([`EventKind::intents`])
//! - The [`EventHandler`] seam between the realtime connection and the
//!   event-dispatch engine
//!
//! # Intents
//!
//! Every event category maps to the Gateway intents required to receive
//! it. Lifecycle categories (ready, resumed) and interactions require
//! none. Masks join with bitwise OR; the join of an empty set is
//! [`Intents::NONE`], and connectable fallback behavior on top of that is
//! owned by the intent reduction in `corvid-bot`.
//!
//! # Example
//!
//! ```
//! use corvid_core::{EventKind, Intents};
//!
//! let mask = EventKind::MessageCreate.intents() | EventKind::ReactionAdd.intents();
//! assert!(mask.contains(Intents::GUILD_MESSAGES));
//! assert!(!mask.contains(Intents::GUILD_PRESENCES));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod event;
mod handler;
mod intents;

pub use event::{
    Channel, Emoji, Event, EventKind, Guild, MemberAdd, MemberRemove, Message, MessageDelete,
    Presence, Reaction, Ready, TypingStart, User,
};
pub use handler::EventHandler;
pub use intents::Intents;
