//! Minimal bot: replies "pong" to any message saying "ping".
//!
//! ```sh
//! DISCORD_TOKEN=... cargo run --example ping
//! ```

use corvid_bot::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> BotResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let token = std::env::var("DISCORD_TOKEN").expect("DISCORD_TOKEN must be set");

    bot(token, |base| {
        base.register_module(|sink: &mut dyn EventSink, ctx: &BotContext| {
            let client = ctx.client().clone();
            sink.on_message_create(handler(move |message: std::sync::Arc<Message>| {
                let client = client.clone();
                async move {
                    if message.content == "ping" {
                        if let Err(error) = client.create_message(&message.channel_id, "pong").await
                        {
                            tracing::warn!(%error, "Failed to send pong");
                        }
                    }
                }
            }));
        });
    })
    .await
}
