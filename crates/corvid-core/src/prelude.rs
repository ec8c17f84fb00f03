//! Prelude module - commonly used types for convenient import.
//!
//! Use `use corvid_core::prelude::*;` to import all essential types.

// Categories and intents
pub use crate::{EventKind, Intents};

// Events and payloads
pub use crate::{
    Channel, Emoji, Event, Guild, MemberAdd, MemberRemove, Message, MessageDelete, Presence,
    Reaction, Ready, TypingStart, User,
};

// Dispatch seam
pub use crate::EventHandler;
