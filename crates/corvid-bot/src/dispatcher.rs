//! The live event-dispatch engine.

use std::sync::Arc;

use corvid_core::{
    Channel, Event, EventHandler, EventKind, Guild, MemberAdd, MemberRemove, Message,
    MessageDelete, Presence, Reaction, Ready, TypingStart,
};
use tracing::trace;

use crate::sink::{EventSink, Handler};

/// The real dispatch engine.
///
/// Owns the callback bindings made during the bind pass and fans every
/// decoded event out to the handlers bound for its category. Each
/// handler runs on its own task, so a panicking or slow callback never
/// stalls the connection's read loop or its shutdown.
#[derive(Default)]
pub struct EventDispatcher {
    ready: Vec<Handler<Ready>>,
    resumed: Vec<Handler<()>>,
    message_create: Vec<Handler<Message>>,
    message_update: Vec<Handler<Message>>,
    message_delete: Vec<Handler<MessageDelete>>,
    reaction_add: Vec<Handler<Reaction>>,
    reaction_remove: Vec<Handler<Reaction>>,
    member_add: Vec<Handler<MemberAdd>>,
    member_remove: Vec<Handler<MemberRemove>>,
    guild_create: Vec<Handler<Guild>>,
    channel_create: Vec<Handler<Channel>>,
    typing_start: Vec<Handler<TypingStart>>,
    presence_update: Vec<Handler<Presence>>,
    interaction_create: Vec<Handler<serde_json::Value>>,
}

impl EventDispatcher {
    /// Create a dispatcher with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers bound for a category.
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Ready => self.ready.len(),
            EventKind::Resumed => self.resumed.len(),
            EventKind::MessageCreate => self.message_create.len(),
            EventKind::MessageUpdate => self.message_update.len(),
            EventKind::MessageDelete => self.message_delete.len(),
            EventKind::ReactionAdd => self.reaction_add.len(),
            EventKind::ReactionRemove => self.reaction_remove.len(),
            EventKind::MemberAdd => self.member_add.len(),
            EventKind::MemberRemove => self.member_remove.len(),
            EventKind::GuildCreate => self.guild_create.len(),
            EventKind::ChannelCreate => self.channel_create.len(),
            EventKind::TypingStart => self.typing_start.len(),
            EventKind::PresenceUpdate => self.presence_update.len(),
            EventKind::InteractionCreate => self.interaction_create.len(),
        }
    }

    /// Spawn one task per bound handler, sharing the payload.
    fn fan_out<T: Send + Sync + 'static>(handlers: &[Handler<T>], payload: T) {
        let payload = Arc::new(payload);
        for h in handlers {
            let h = Arc::clone(h);
            let payload = Arc::clone(&payload);
            tokio::spawn(async move {
                h(payload).await;
            });
        }
    }
}

impl EventSink for EventDispatcher {
    fn on_ready(&mut self, handler: Handler<Ready>) {
        self.ready.push(handler);
    }

    fn on_resumed(&mut self, handler: Handler<()>) {
        self.resumed.push(handler);
    }

    fn on_message_create(&mut self, handler: Handler<Message>) {
        self.message_create.push(handler);
    }

    fn on_message_update(&mut self, handler: Handler<Message>) {
        self.message_update.push(handler);
    }

    fn on_message_delete(&mut self, handler: Handler<MessageDelete>) {
        self.message_delete.push(handler);
    }

    fn on_reaction_add(&mut self, handler: Handler<Reaction>) {
        self.reaction_add.push(handler);
    }

    fn on_reaction_remove(&mut self, handler: Handler<Reaction>) {
        self.reaction_remove.push(handler);
    }

    fn on_member_add(&mut self, handler: Handler<MemberAdd>) {
        self.member_add.push(handler);
    }

    fn on_member_remove(&mut self, handler: Handler<MemberRemove>) {
        self.member_remove.push(handler);
    }

    fn on_guild_create(&mut self, handler: Handler<Guild>) {
        self.guild_create.push(handler);
    }

    fn on_channel_create(&mut self, handler: Handler<Channel>) {
        self.channel_create.push(handler);
    }

    fn on_typing_start(&mut self, handler: Handler<TypingStart>) {
        self.typing_start.push(handler);
    }

    fn on_presence_update(&mut self, handler: Handler<Presence>) {
        self.presence_update.push(handler);
    }

    fn on_interaction_create(&mut self, handler: Handler<serde_json::Value>) {
        self.interaction_create.push(handler);
    }
}

impl EventHandler for EventDispatcher {
    fn handle_event(&self, event: Event) {
        trace!(kind = ?event.kind(), "Dispatching event");
        match event {
            Event::Ready(payload) => Self::fan_out(&self.ready, payload),
            Event::Resumed => Self::fan_out(&self.resumed, ()),
            Event::MessageCreate(payload) => Self::fan_out(&self.message_create, payload),
            Event::MessageUpdate(payload) => Self::fan_out(&self.message_update, payload),
            Event::MessageDelete(payload) => Self::fan_out(&self.message_delete, payload),
            Event::ReactionAdd(payload) => Self::fan_out(&self.reaction_add, payload),
            Event::ReactionRemove(payload) => Self::fan_out(&self.reaction_remove, payload),
            Event::MemberAdd(payload) => Self::fan_out(&self.member_add, payload),
            Event::MemberRemove(payload) => Self::fan_out(&self.member_remove, payload),
            Event::GuildCreate(payload) => Self::fan_out(&self.guild_create, payload),
            Event::ChannelCreate(payload) => Self::fan_out(&self.channel_create, payload),
            Event::TypingStart(payload) => Self::fan_out(&self.typing_start, payload),
            Event::PresenceUpdate(payload) => Self::fan_out(&self.presence_update, payload),
            Event::InteractionCreate(payload) => Self::fan_out(&self.interaction_create, payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::handler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn message(content: &str) -> Message {
        Message {
            id: "1".into(),
            channel_id: "2".into(),
            guild_id: None,
            author: None,
            content: content.into(),
        }
    }

    #[test]
    fn bindings_accumulate_per_category() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on_message_create(handler(|_| async {}));
        dispatcher.on_message_create(handler(|_| async {}));
        dispatcher.on_ready(handler(|_| async {}));

        assert_eq!(dispatcher.handler_count(EventKind::MessageCreate), 2);
        assert_eq!(dispatcher.handler_count(EventKind::Ready), 1);
        assert_eq!(dispatcher.handler_count(EventKind::TypingStart), 0);
    }

    #[tokio::test]
    async fn every_bound_handler_receives_the_event() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            dispatcher.on_message_create(handler(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        dispatcher.handle_event(Event::MessageCreate(message("hi")));

        // Handlers run on spawned tasks; give them a moment.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn events_only_reach_their_own_category() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on_message_delete(handler(move |_| {
            let counter = Arc::clone(&counter_clone);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        dispatcher.handle_event(Event::MessageCreate(message("hi")));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn panicking_handler_does_not_poison_others() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on_message_create(handler(|_| async {
            panic!("callback failure");
        }));
        dispatcher.on_message_create(handler(move |_| {
            let counter = Arc::clone(&counter_clone);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        dispatcher.handle_event(Event::MessageCreate(message("hi")));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
