//! The event-subscription surface modules are written against.

use std::future::Future;
use std::sync::Arc;

use corvid_core::{
    Channel, Guild, MemberAdd, MemberRemove, Message, MessageDelete, Presence, Reaction, Ready,
    TypingStart,
};
use futures::future::BoxFuture;

/// A boxed asynchronous event callback.
///
/// The payload arrives behind an [`Arc`] because several handlers may be
/// bound to the same category.
pub type Handler<T> = Arc<dyn Fn(Arc<T>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure into a [`Handler`].
pub fn handler<T, F, Fut>(f: F) -> Handler<T>
where
    F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |payload| Box::pin(f(payload)))
}

/// The subscription surface: one registration method per event category.
///
/// Two implementations exist — the dry-run
/// [`IntentRecorder`](crate::IntentRecorder), which records the touched
/// categories without binding anything, and the live
/// [`EventDispatcher`](crate::EventDispatcher), which binds callbacks
/// for dispatch. Modules are written only against this trait, never
/// against a concrete implementation, so both bootstrap passes see the
/// exact same subscription calls.
pub trait EventSink {
    /// Subscribe to session establishment (`READY`).
    fn on_ready(&mut self, handler: Handler<Ready>);

    /// Subscribe to session resumption (`RESUMED`).
    fn on_resumed(&mut self, handler: Handler<()>);

    /// Subscribe to posted messages (`MESSAGE_CREATE`).
    fn on_message_create(&mut self, handler: Handler<Message>);

    /// Subscribe to edited messages (`MESSAGE_UPDATE`).
    fn on_message_update(&mut self, handler: Handler<Message>);

    /// Subscribe to deleted messages (`MESSAGE_DELETE`).
    fn on_message_delete(&mut self, handler: Handler<MessageDelete>);

    /// Subscribe to added reactions (`MESSAGE_REACTION_ADD`).
    fn on_reaction_add(&mut self, handler: Handler<Reaction>);

    /// Subscribe to removed reactions (`MESSAGE_REACTION_REMOVE`).
    fn on_reaction_remove(&mut self, handler: Handler<Reaction>);

    /// Subscribe to members joining a guild (`GUILD_MEMBER_ADD`).
    fn on_member_add(&mut self, handler: Handler<MemberAdd>);

    /// Subscribe to members leaving a guild (`GUILD_MEMBER_REMOVE`).
    fn on_member_remove(&mut self, handler: Handler<MemberRemove>);

    /// Subscribe to guilds becoming available (`GUILD_CREATE`).
    fn on_guild_create(&mut self, handler: Handler<Guild>);

    /// Subscribe to channel creation (`CHANNEL_CREATE`).
    fn on_channel_create(&mut self, handler: Handler<Channel>);

    /// Subscribe to typing indicators (`TYPING_START`).
    fn on_typing_start(&mut self, handler: Handler<TypingStart>);

    /// Subscribe to presence changes (`PRESENCE_UPDATE`).
    fn on_presence_update(&mut self, handler: Handler<Presence>);

    /// Subscribe to interactions (`INTERACTION_CREATE`).
    fn on_interaction_create(&mut self, handler: Handler<serde_json::Value>);
}
