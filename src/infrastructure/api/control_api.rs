#[cfg(test)]
#[path = "control_api_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use reqwest::header::COOKIE;
use serde::Serialize;
use serde_derive::Serialize;
use strum::EnumString;
use strum::EnumVariantNames;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ConfirmPrompt;
use crate::domain::models::Notice;
use crate::domain::models::SyncError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct CompetitionRequest<'a> {
    name: &'a str,
    assignments: &'a [String],
}

#[derive(Debug, Serialize)]
struct EmptyRequest {}

/// Lifecycle changes an organizer can apply to an assignment of a running
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AssignmentOperation {
    Start,
    Stop,
    Reset,
}

impl AssignmentOperation {
    pub fn prompt(&self, name: &str) -> ConfirmPrompt {
        match self {
            AssignmentOperation::Start => {
                return ConfirmPrompt::new("Start assignment", &format!("Start assignment '{name}'?"));
            }
            AssignmentOperation::Stop => {
                return ConfirmPrompt::new(
                    "Stop assignment",
                    &format!("Stop assignment '{name}' and finalize scores for teams?"),
                );
            }
            AssignmentOperation::Reset => {
                return ConfirmPrompt::new(
                    "Reset assignment",
                    &format!("Stop assignment '{name}' and reset scores for teams?"),
                );
            }
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            AssignmentOperation::Start => return "Started",
            AssignmentOperation::Stop => return "Stopped",
            AssignmentOperation::Reset => return "Reset",
        }
    }
}

/// HTTP side-channel of the competition server. Only success matters,
/// response bodies are ignored.
pub struct ControlApi {
    url: String,
    cookie: String,
}

impl Default for ControlApi {
    fn default() -> ControlApi {
        return ControlApi {
            url: Config::get(ConfigKey::ServerURL),
            cookie: Config::get(ConfigKey::SessionCookie),
        };
    }
}

impl ControlApi {
    async fn post<T: Serialize>(&self, path: &str, body: &T, action: &str) -> Result<()> {
        let url = format!("{}{path}", self.url.trim_end_matches('/'));
        let mut req = reqwest::Client::new()
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(body);
        if !self.cookie.is_empty() {
            req = req.header(COOKIE, &self.cookie);
        }

        let res = req.send().await;
        if let Err(err) = res {
            tracing::error!(error = ?err, %url, "Control API request failed");
            return Err(SyncError::ServerRejected {
                action: action.to_string(),
            }
            .into());
        }

        let res = res?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), %url, "Control API rejected request");
            return Err(SyncError::ServerRejected {
                action: action.to_string(),
            }
            .into());
        }

        return Ok(());
    }

    pub async fn create_competition(&self, name: &str, assignments: &[String]) -> Result<Notice> {
        self.post(
            "/api/competition",
            &CompetitionRequest { name, assignments },
            &format!("create competition {name}"),
        )
        .await?;

        return Ok(Notice::success(&format!("Created competition {name}.")));
    }

    pub async fn start_session(&self, competition_id: &str, name: &str) -> Result<Notice> {
        self.post(
            &format!("/api/competition/{competition_id}/session"),
            &EmptyRequest {},
            &format!("start competition session for competition {name}"),
        )
        .await?;

        return Ok(Notice::success(&format!(
            "Started competition session for competition {name}."
        )));
    }

    pub async fn change_assignment(
        &self,
        session_id: &str,
        assignment_id: &str,
        name: &str,
        operation: AssignmentOperation,
    ) -> Result<Notice> {
        self.post(
            &format!("/api/session/{session_id}/assignment/{assignment_id}/{operation}"),
            &EmptyRequest {},
            &format!("{operation} assignment '{name}'"),
        )
        .await?;

        return Ok(Notice::success(&format!(
            "{} assignment '{name}'.",
            operation.past_tense()
        )));
    }
}
