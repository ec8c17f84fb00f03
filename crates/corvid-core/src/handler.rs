//! Seam between the realtime connection and the event-dispatch engine.

use crate::Event;

/// Consumer of decoded dispatch events.
///
/// The realtime connection hands every decoded event to this trait and
/// knows nothing about how callbacks are stored or scheduled; the
/// dispatch engine in `corvid-bot` is the production implementation.
pub trait EventHandler: Send + Sync {
    /// Handle one decoded event.
    ///
    /// Called from the connection's read loop; implementations must not
    /// block and are expected to schedule any real work on their own
    /// tasks.
    fn handle_event(&self, event: Event);
}
