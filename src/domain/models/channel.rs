use std::sync::Arc;

use anyhow::Result;
use strum::EnumString;
use strum::EnumVariantNames;

use super::Topic;

/// Which side of the competition the client mirrors. Each mode talks to its
/// own websocket endpoint and subscribes to its own topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelMode {
    Control,
    Feedback,
}

impl ChannelMode {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ChannelMode::Control => return "/control/websocket",
            ChannelMode::Feedback => return "/submit/websocket",
        }
    }

    pub fn topics(&self) -> Vec<Topic> {
        match self {
            ChannelMode::Control => {
                return vec![
                    Topic::UserControlFeedback,
                    Topic::ControlFeedback,
                    Topic::Time,
                    Topic::Start,
                    Topic::Stop,
                ];
            }
            ChannelMode::Feedback => {
                return vec![
                    Topic::UserFeedback,
                    Topic::UserCompileFeedback,
                    Topic::Start,
                    Topic::Stop,
                ];
            }
        }
    }
}

/// Proof that a delivery was received on a given connection. Acknowledging
/// it on a later connection is pointless, the broker redelivers instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AckHandle {
    pub generation: u64,
    pub headers: Vec<(String, String)>,
}

/// A message received on one of the subscribed topics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub topic: Topic,
    pub body: String,
    pub ack: Option<AckHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// The single control connection, shared by whatever needs to publish.
pub trait ControlChannel {
    /// Liveness of the underlying connection. Only the connection machinery
    /// changes it.
    fn is_connected(&self) -> bool;

    /// Queues a SEND frame with a JSON body.
    fn publish(&self, destination: &str, body: &str) -> Result<()>;

    /// Acknowledges a delivery once its handler completed.
    fn ack(&self, handle: &AckHandle) -> Result<()>;

    /// Drops the current connection and connects again right away.
    fn resynchronize(&self);
}

pub type ChannelBox = Arc<dyn ControlChannel + Send + Sync>;
