//! Dry-run recorder: observes subscriptions without binding them.

use std::collections::HashSet;

use corvid_core::{
    Channel, EventKind, Guild, Intents, MemberAdd, MemberRemove, Message, MessageDelete, Presence,
    Reaction, Ready, TypingStart,
};

use crate::sink::{EventSink, Handler};

/// Records which event categories modules subscribe to.
///
/// Implements the full [`EventSink`] surface; every registration call
/// records its category into one shared set and discards the handler
/// without ever invoking it. Recording the same category twice has no
/// further effect, and there are no error conditions.
///
/// One recorder exists per bootstrap invocation and accumulates across
/// every module's dry-run registration call.
#[derive(Debug, Default)]
pub struct IntentRecorder {
    recorded: HashSet<EventKind>,
}

impl IntentRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, kind: EventKind) {
        self.recorded.insert(kind);
    }

    /// The categories recorded so far.
    #[must_use]
    pub fn recorded(&self) -> &HashSet<EventKind> {
        &self.recorded
    }

    /// Reduce the recorded categories to the minimal privilege mask.
    ///
    /// Maps every recorded category through the fixed
    /// [`EventKind::intents`] table and joins with bitwise OR; the join
    /// order never affects the result. When nothing was recorded, or
    /// everything recorded requires no privilege (lifecycle categories),
    /// the designated [`Intents::NON_PRIVILEGED`] mask is returned so
    /// the connection always identifies with a real, connectable value.
    #[must_use]
    pub fn into_intents(self) -> Intents {
        let joined = self
            .recorded
            .iter()
            .fold(Intents::NONE, |mask, kind| mask | kind.intents());
        if joined.is_empty() {
            Intents::NON_PRIVILEGED
        } else {
            joined
        }
    }
}

impl EventSink for IntentRecorder {
    fn on_ready(&mut self, _handler: Handler<Ready>) {
        self.record(EventKind::Ready);
    }

    fn on_resumed(&mut self, _handler: Handler<()>) {
        self.record(EventKind::Resumed);
    }

    fn on_message_create(&mut self, _handler: Handler<Message>) {
        self.record(EventKind::MessageCreate);
    }

    fn on_message_update(&mut self, _handler: Handler<Message>) {
        self.record(EventKind::MessageUpdate);
    }

    fn on_message_delete(&mut self, _handler: Handler<MessageDelete>) {
        self.record(EventKind::MessageDelete);
    }

    fn on_reaction_add(&mut self, _handler: Handler<Reaction>) {
        self.record(EventKind::ReactionAdd);
    }

    fn on_reaction_remove(&mut self, _handler: Handler<Reaction>) {
        self.record(EventKind::ReactionRemove);
    }

    fn on_member_add(&mut self, _handler: Handler<MemberAdd>) {
        self.record(EventKind::MemberAdd);
    }

    fn on_member_remove(&mut self, _handler: Handler<MemberRemove>) {
        self.record(EventKind::MemberRemove);
    }

    fn on_guild_create(&mut self, _handler: Handler<Guild>) {
        self.record(EventKind::GuildCreate);
    }

    fn on_channel_create(&mut self, _handler: Handler<Channel>) {
        self.record(EventKind::ChannelCreate);
    }

    fn on_typing_start(&mut self, _handler: Handler<TypingStart>) {
        self.record(EventKind::TypingStart);
    }

    fn on_presence_update(&mut self, _handler: Handler<Presence>) {
        self.record(EventKind::PresenceUpdate);
    }

    fn on_interaction_create(&mut self, _handler: Handler<serde_json::Value>) {
        self.record(EventKind::InteractionCreate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::handler;

    #[test]
    fn empty_recorder_reduces_to_non_privileged() {
        assert_eq!(IntentRecorder::new().into_intents(), Intents::NON_PRIVILEGED);
    }

    #[test]
    fn lifecycle_only_reduces_to_non_privileged() {
        let mut recorder = IntentRecorder::new();
        recorder.on_ready(handler(|_| async {}));
        recorder.on_resumed(handler(|_| async {}));
        assert_eq!(recorder.into_intents(), Intents::NON_PRIVILEGED);
    }

    #[test]
    fn single_category_reduces_to_exactly_its_intents() {
        let mut recorder = IntentRecorder::new();
        recorder.on_message_create(handler(|_| async {}));
        assert_eq!(
            recorder.into_intents(),
            Intents::GUILD_MESSAGES | Intents::DIRECT_MESSAGES
        );
    }

    #[test]
    fn recording_is_idempotent() {
        let mut recorder = IntentRecorder::new();
        recorder.on_message_create(handler(|_| async {}));
        recorder.on_message_create(handler(|_| async {}));
        assert_eq!(recorder.recorded().len(), 1);
        assert_eq!(
            recorder.into_intents(),
            Intents::GUILD_MESSAGES | Intents::DIRECT_MESSAGES
        );
    }

    #[test]
    fn join_accumulates_across_categories() {
        let mut recorder = IntentRecorder::new();
        recorder.on_message_create(handler(|_| async {}));
        recorder.on_member_add(handler(|_| async {}));
        let mask = recorder.into_intents();
        assert!(mask.contains(Intents::GUILD_MESSAGES));
        assert!(mask.contains(Intents::GUILD_MEMBERS));
        assert!(mask.requires_privilege());
    }

    #[test]
    fn handlers_are_never_invoked() {
        let mut recorder = IntentRecorder::new();
        recorder.on_ready(handler(|_| async {
            panic!("dry-run must not execute user logic");
        }));
        assert_eq!(recorder.recorded().len(), 1);
    }
}
