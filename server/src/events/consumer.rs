//! Redis pub/sub subscriber feeding the relay.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use redis::aio::PubSub;
use redis::Client as RedisClient;
use tokio::time::sleep;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use super::EventRelay;

/// Spawn the consumer as a Tokio task; it resubscribes whenever the stream ends.
pub fn start(client: RedisClient, channel: String, relay: Arc<EventRelay>) {
    tokio::spawn(async move {
        loop {
            match run(&client, &channel, &relay).await {
                Ok(()) => log::warn!("event stream on {channel} closed, resubscribing"),
                Err(e) => log::error!("event consumer failed: {e:?}"),
            }
            sleep(Duration::from_secs(1)).await;
        }
    });
}

async fn subscribe(client: &RedisClient, channel: &str) -> redis::RedisResult<PubSub> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(10))
        .map(jitter);

    Retry::spawn(strategy, || {
        let client = client.clone();
        let channel = channel.to_owned();
        async move {
            let mut pubsub = client.get_async_pubsub().await.inspect_err(|e| {
                log::warn!("redis pub/sub connect failed: {e}");
            })?;
            pubsub.subscribe(&channel).await?;
            Ok::<_, redis::RedisError>(pubsub)
        }
    })
    .await
}

/// Consume one subscription until the connection drops.
pub async fn run(
    client: &RedisClient,
    channel: &str,
    relay: &EventRelay,
) -> redis::RedisResult<()> {
    let mut pubsub = subscribe(client, channel).await?;
    log::info!("listening for events on {channel}");

    let mut messages = pubsub.on_message();
    while let Some(msg) = messages.next().await {
        match msg.get_payload::<String>() {
            Ok(raw) => relay.dispatch_raw(&raw).await,
            Err(e) => log::warn!("non-text message on {channel}: {e}"),
        }
    }
    Ok(())
}
