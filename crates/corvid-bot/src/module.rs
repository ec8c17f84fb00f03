//! Module abstraction and the registry they are collected in.

use tracing::info;

use crate::context::BotContext;
use crate::sink::{EventSink, handler};

/// A unit of bot functionality.
///
/// A module's only obligation is to subscribe to event categories
/// through the sink it is handed. Registration runs twice per bootstrap,
/// once against the dry-run recorder and once against the live
/// dispatcher, so it must be deterministic: same subscriptions, same
/// order, both times. Handlers passed during the dry run are discarded
/// without being invoked.
pub trait BotModule: Send + Sync {
    /// Subscribe this module's handlers through `sink`.
    fn register(&self, sink: &mut dyn EventSink, ctx: &BotContext);
}

impl<F> BotModule for F
where
    F: Fn(&mut dyn EventSink, &BotContext) + Send + Sync,
{
    fn register(&self, sink: &mut dyn EventSink, ctx: &BotContext) {
        self(sink, ctx);
    }
}

/// Ordered registry of modules for one bot.
///
/// Construction installs a built-in module that logs session lifecycle
/// transitions; user modules are appended after it and registration
/// always replays the full list in insertion order.
pub struct BotBase {
    modules: Vec<Box<dyn BotModule>>,
}

impl BotBase {
    /// Create a registry holding only the built-in lifecycle logger.
    #[must_use]
    pub fn new() -> Self {
        let mut base = Self {
            modules: Vec::new(),
        };
        base.register_module(lifecycle_logger);
        base
    }

    /// Append a module. Insertion order is registration order.
    pub fn register_module(&mut self, module: impl BotModule + 'static) {
        self.modules.push(Box::new(module));
    }

    /// The registered modules, built-in logger first.
    #[must_use]
    pub fn modules(&self) -> &[Box<dyn BotModule>] {
        &self.modules
    }
}

impl Default for BotBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in module: logs READY and RESUMED transitions.
///
/// Subscribes only to lifecycle categories, which map to no intent
/// bits, so its presence never widens the inferred mask.
fn lifecycle_logger(sink: &mut dyn EventSink, _ctx: &BotContext) {
    sink.on_ready(handler(|ready: std::sync::Arc<corvid_core::Ready>| async move {
        info!(user = ?ready.user.username, session = %ready.session_id, "Bot is connected and ready");
    }));
    sink.on_resumed(handler(|_| async {
        info!("Bot resumed a previous session");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::IntentRecorder;
    use corvid_core::{EventKind, Intents};
    use corvid_gateway::RestClient;

    fn context() -> BotContext {
        BotContext::new(RestClient::new("test-token"))
    }

    #[test]
    fn new_registry_contains_the_builtin_logger() {
        let base = BotBase::new();
        assert_eq!(base.modules().len(), 1);

        let ctx = context();
        let mut recorder = IntentRecorder::new();
        for module in base.modules() {
            module.register(&mut recorder, &ctx);
        }
        assert!(recorder.recorded().contains(&EventKind::Ready));
        assert!(recorder.recorded().contains(&EventKind::Resumed));
        assert_eq!(recorder.into_intents(), Intents::NON_PRIVILEGED);
    }

    #[test]
    fn user_modules_follow_the_builtin() {
        let mut base = BotBase::new();
        base.register_module(|sink: &mut dyn EventSink, _ctx: &BotContext| {
            sink.on_message_create(handler(|_| async {}));
        });
        base.register_module(|sink: &mut dyn EventSink, _ctx: &BotContext| {
            sink.on_member_add(handler(|_| async {}));
        });
        assert_eq!(base.modules().len(), 3);
    }

    #[test]
    fn registration_replays_in_insertion_order() {
        use std::sync::Mutex;

        let seen: &'static Mutex<Vec<&'static str>> = Box::leak(Box::new(Mutex::new(Vec::new())));
        let mut base = BotBase::new();
        base.register_module(move |_sink: &mut dyn EventSink, _ctx: &BotContext| {
            seen.lock().unwrap().push("first");
        });
        base.register_module(move |_sink: &mut dyn EventSink, _ctx: &BotContext| {
            seen.lock().unwrap().push("second");
        });

        let ctx = context();
        let mut recorder = IntentRecorder::new();
        for module in base.modules() {
            module.register(&mut recorder, &ctx);
        }
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }
}
