//! One-stop import for Gateway consumers.
//!
//! ```rust
//! use corvid_gateway::prelude::*;
//! ```

pub use crate::error::{GatewayError, GatewayResult};
pub use crate::gateway::{Connection, Gateway, GatewayConfig, ShutdownHandle};
pub use crate::rest::{CurrentUser, GatewayBot, RestClient};

pub use corvid_core::{Event, EventHandler, EventKind, Intents};
