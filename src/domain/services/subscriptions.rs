#[cfg(test)]
#[path = "subscriptions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::ChannelBox;
use crate::domain::models::Delivery;
use crate::domain::models::TopicHandlerBox;

async fn dispatch(
    channel: &ChannelBox,
    handlers: &[TopicHandlerBox],
    delivery: Delivery,
) -> Result<()> {
    let handler = handlers
        .iter()
        .find(|e| return e.topics().contains(&delivery.topic));

    match handler {
        Some(handler) => {
            // A payload that fails to decode would fail again on
            // redelivery, so it is logged and acknowledged like any other.
            if let Err(err) = handler.handle(delivery.topic, &delivery.body).await {
                tracing::warn!(topic = %delivery.topic, error = ?err, "Delivery failed");
            }
        }
        None => tracing::warn!(topic = %delivery.topic, "No handler for topic"),
    }

    if let Some(ack) = &delivery.ack {
        channel.ack(ack)?;
    }

    return Ok(());
}

/// Hands deliveries one at a time to the handler owning their topic, then
/// acknowledges them.
pub struct SubscriptionService {}

impl SubscriptionService {
    pub async fn start(
        channel: ChannelBox,
        handlers: Vec<TopicHandlerBox>,
        rx: &mut mpsc::UnboundedReceiver<Delivery>,
    ) -> Result<()> {
        while let Some(delivery) = rx.recv().await {
            dispatch(&channel, &handlers, delivery).await?;
        }

        return Ok(());
    }
}
