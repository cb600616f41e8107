use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::ControlRequest;
use super::Topic;

/// Consumes deliveries of the topics it owns.
#[async_trait]
pub trait TopicHandler {
    fn topics(&self) -> Vec<Topic>;

    /// Applies one delivery. The delivery is acknowledged once this returns.
    async fn handle(&self, topic: Topic, body: &str) -> Result<()>;
}

pub type TopicHandlerBox = Arc<dyn TopicHandler + Send + Sync>;

/// Runs user actions against the control channel.
#[async_trait]
pub trait ActionHandler {
    async fn execute(&self, request: ControlRequest) -> Result<()>;

    /// Runs after the session state was reloaded, before the channel
    /// resynchronizes.
    #[allow(clippy::implicit_return)]
    async fn reload(&self) -> Result<()> {
        return Ok(());
    }
}

pub type ActionHandlerBox = Arc<dyn ActionHandler + Send + Sync>;
