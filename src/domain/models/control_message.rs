#[cfg(test)]
#[path = "control_message_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Topic;

#[derive(Debug, Deserialize)]
struct ControlFeedbackPayload {
    #[serde(default)]
    assignment: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePayload {
    pub remaining_time: i64,
    pub total_time: i64,
}

/// Text the server sends on the user control queue when the page must
/// reload.
pub fn is_reload_directive(text: &str) -> bool {
    return text.contains("reload");
}

/// Inbound signal on one of the control topics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    Reload,
    Stop,
    TimeSync { remaining: i64, total: i64 },
    Feedback { text: String },
}

impl ControlMessage {
    pub fn decode(topic: Topic, body: &str) -> Result<ControlMessage> {
        match topic {
            Topic::UserControlFeedback => {
                return Ok(ControlMessage::Feedback {
                    text: body.to_string(),
                });
            }
            Topic::ControlFeedback => {
                let payload: ControlFeedbackPayload = serde_json::from_str(body)?;
                return Ok(ControlMessage::Feedback {
                    text: format!(
                        "[{}] {}",
                        payload.assignment.unwrap_or_default(),
                        payload.cause.unwrap_or_default()
                    ),
                });
            }
            Topic::Time => {
                let payload: TimePayload = serde_json::from_str(body)?;
                return Ok(ControlMessage::TimeSync {
                    remaining: payload.remaining_time,
                    total: payload.total_time,
                });
            }
            Topic::Start => return Ok(ControlMessage::Reload),
            Topic::Stop => return Ok(ControlMessage::Stop),
            _ => bail!(format!("{topic} is not a control topic")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFeedback {
    pub test: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub submit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileFeedback {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub success: bool,
}

/// Inbound result of a compile or test run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackMessage {
    Test(TestFeedback),
    Compile(CompileFeedback),
}

impl FeedbackMessage {
    pub fn decode(topic: Topic, body: &str) -> Result<FeedbackMessage> {
        match topic {
            Topic::UserFeedback => {
                return Ok(FeedbackMessage::Test(serde_json::from_str(body)?));
            }
            Topic::UserCompileFeedback => {
                return Ok(FeedbackMessage::Compile(serde_json::from_str(body)?));
            }
            _ => bail!(format!("{topic} is not a feedback topic")),
        }
    }
}
