#[cfg(test)]
#[path = "session_sync_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::Outbox;
use crate::domain::models::is_reload_directive;
use crate::domain::models::ActionHandler;
use crate::domain::models::ChannelMode;
use crate::domain::models::Command;
use crate::domain::models::ConfirmPrompt;
use crate::domain::models::ConfirmerBox;
use crate::domain::models::ControlAction;
use crate::domain::models::ControlMessage;
use crate::domain::models::ControlRequest;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::SessionView;
use crate::domain::models::StartPlan;
use crate::domain::models::SyncError;
use crate::domain::models::Topic;
use crate::domain::models::TopicHandler;

/// Mirrors the control topics into local state and turns organizer actions
/// into control commands.
pub struct SessionSync {
    outbox: Outbox,
    confirmer: ConfirmerBox,
    year: String,
}

impl SessionSync {
    pub fn new(outbox: Outbox, confirmer: ConfirmerBox, year: &str) -> SessionSync {
        return SessionSync {
            outbox,
            confirmer,
            year: year.to_string(),
        };
    }

    pub fn send(&self, command: &Command) -> Result<()> {
        self.outbox.send(command)?;
        return Ok(());
    }

    pub fn apply(&self, topic: Topic, message: ControlMessage) -> Result<()> {
        match message {
            ControlMessage::Feedback { text } => {
                self.outbox.notify(Notice::alert(&text))?;
                if topic == Topic::UserControlFeedback && is_reload_directive(&text) {
                    self.outbox.scheduler().reload();
                }
            }
            ControlMessage::TimeSync { remaining, total } => {
                self.outbox.emit(Event::ClockSync(remaining, total))?;
            }
            ControlMessage::Reload => self.outbox.scheduler().reload(),
            ControlMessage::Stop => self.outbox.emit(Event::ClockStop())?,
        }

        return Ok(());
    }

    async fn start_task(&self, view: &SessionView) -> Result<()> {
        let plan = view.plan_start()?;
        let task_name = view.selected()?.name.to_string();

        match plan {
            StartPlan::Start(command) => {
                if self.outbox.send(&command)? {
                    let total = view.selected()?.total_time_seconds;
                    self.outbox.emit(Event::ClockPrime(total))?;
                }
            }
            StartPlan::ConfirmRestart(command) => {
                self.confirmer
                    .confirm(ConfirmPrompt::restart(&task_name))
                    .await?;
                self.send(&command)?;
            }
            StartPlan::ConfirmSwitch(command) => {
                self.confirmer
                    .confirm(ConfirmPrompt::switch_now(&task_name))
                    .await?;
                self.send(&command)?;
            }
        }

        return Ok(());
    }

    /// Competition names carry their year as `name|year`.
    fn competition_name(&self, argument: &str) -> Option<String> {
        let name = argument.trim();
        if name.is_empty() {
            return None;
        }
        if name.contains('|') {
            return Some(name.to_string());
        }

        return Some(format!("{name}|{}", self.year));
    }
}

#[async_trait]
impl TopicHandler for SessionSync {
    fn topics(&self) -> Vec<Topic> {
        return ChannelMode::Control.topics();
    }

    #[allow(clippy::implicit_return)]
    async fn handle(&self, topic: Topic, body: &str) -> Result<()> {
        let message = ControlMessage::decode(topic, body)?;
        tracing::debug!(%topic, ?message, "Control message");
        return self.apply(topic, message);
    }
}

#[async_trait]
impl ActionHandler for SessionSync {
    #[allow(clippy::implicit_return)]
    async fn execute(&self, request: ControlRequest) -> Result<()> {
        let view = &request.view;

        match request.action {
            ControlAction::StartTask => return self.start_task(view).await,
            ControlAction::StopTask => {
                view.selected()?;
                self.send(&Command::StopTask { task_name: None })?;
            }
            ControlAction::RestartAssignment => {
                let task_name = view.selected()?.name.to_string();
                self.send(&Command::RestartAssignment {
                    task_name,
                    value: None,
                })?;
            }
            ControlAction::PauseResume => self.send(&Command::PauseResume)?,
            ControlAction::ClearCompetition => {
                self.send(&Command::ClearCompetition)?;
                self.outbox
                    .notify(Notice::alert("session has been restarted"))?;
            }
            ControlAction::CompetitionCreateNew => {
                let argument = request.argument.unwrap_or_default();
                if let Some(name) = self.competition_name(&argument) {
                    self.send(&Command::CompetitionCreateNew { name })?;
                }
            }
            ControlAction::CompetitionDelete => {
                let argument = request.argument.unwrap_or_default();
                let uuid = argument.trim();
                if Uuid::parse_str(uuid).is_err() {
                    self.outbox.notify(Notice::alert(&format!(
                        "'{uuid}' is not a valid competition id."
                    )))?;
                    return Ok(());
                }
                self.send(&Command::CompetitionDelete {
                    uuid: uuid.to_string(),
                })?;
            }
            ControlAction::ScanAssignments => self.send(&Command::ScanAssignments)?,
            action => return Err(SyncError::UnknownAction(action.to_string()).into()),
        }

        return Ok(());
    }
}
