//! The bootstrap entry point: configure, infer, bind, run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use corvid_gateway::{Connection, Gateway, RestClient};

use crate::context::BotContext;
use crate::dispatcher::EventDispatcher;
use crate::error::BotResult;
use crate::module::BotBase;
use crate::recorder::IntentRecorder;

/// Bootstrap and run a bot until shutdown.
///
/// The sequence is fixed:
///
/// 1. **Configure** — build a [`BotBase`] and hand it to `configure`.
/// 2. **Infer** — register every module against a dry-run
///    [`IntentRecorder`] and reduce the recorded categories to the
///    minimal Gateway intent mask.
/// 3. **Bind** — register the same modules, in the same order, with the
///    same context, against the live [`EventDispatcher`].
/// 4. **Run** — open the Gateway connection with the inferred mask and
///    block until a clean close, a fatal error, or Ctrl-C.
///
/// Teardown always runs once the connection loop returns, whatever the
/// outcome.
///
/// # Errors
///
/// Returns the first Gateway failure: connection establishment,
/// authentication rejection, an invalid intent mask, or exhausted
/// reconnect attempts.
pub async fn bot(
    token: impl Into<String>,
    configure: impl FnOnce(&mut BotBase),
) -> BotResult<()> {
    let token = token.into();

    let mut base = BotBase::new();
    configure(&mut base);

    let client = RestClient::new(token.clone());
    let ctx = BotContext::new(client.clone());

    let mut recorder = IntentRecorder::new();
    for module in base.modules() {
        module.register(&mut recorder, &ctx);
    }
    let intents = recorder.into_intents();
    debug!(intents = ?intents, modules = base.modules().len(), "Inferred Gateway intents");

    let mut dispatcher = EventDispatcher::new();
    for module in base.modules() {
        module.register(&mut dispatcher, &ctx);
    }

    let gateway = Gateway::new(token, intents, client, Arc::new(dispatcher));

    let shutdown = gateway.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                shutdown.signal();
            },
            Err(error) => warn!(%error, "Failed to listen for Ctrl-C"),
        }
    });

    run_lifecycle(gateway).await
}

/// Drive a connection through its full lifecycle.
///
/// Starts the connection, blocks on its run loop, and stops it. Stop
/// runs whether the run loop succeeded or failed; a start failure
/// propagates immediately since there is nothing to stop.
///
/// # Errors
///
/// Propagates the connection's start or run failure.
pub async fn run_lifecycle<C: Connection>(mut conn: C) -> BotResult<()> {
    conn.start().await?;
    let outcome = conn.run().await;
    conn.stop().await;
    outcome?;
    Ok(())
}
