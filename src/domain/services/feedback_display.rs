#[cfg(test)]
#[path = "feedback_display_test.rs"]
mod tests;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use anyhow::Result;
use async_trait::async_trait;

use super::Outbox;
use super::Workspace;
use crate::domain::models::ActionHandler;
use crate::domain::models::ChannelMode;
use crate::domain::models::Command;
use crate::domain::models::ControlAction;
use crate::domain::models::ControlRequest;
use crate::domain::models::Event;
use crate::domain::models::FeedbackMessage;
use crate::domain::models::OutputRegion;
use crate::domain::models::SyncError;
use crate::domain::models::Topic;
use crate::domain::models::TopicHandler;

/// Shows compile and test results, and submits the team's sources.
pub struct FeedbackDisplay {
    outbox: Outbox,
    workspace: Workspace,
    locked: AtomicBool,
}

impl FeedbackDisplay {
    pub fn new(outbox: Outbox, workspace: Workspace) -> FeedbackDisplay {
        return FeedbackDisplay {
            outbox,
            workspace,
            locked: AtomicBool::new(false),
        };
    }

    pub fn is_locked(&self) -> bool {
        return self.locked.load(Ordering::SeqCst);
    }

    /// Editing ends until the next reload. The flag is only raised once the
    /// files are read-only and the UI was told.
    pub async fn lock(&self) -> Result<()> {
        if self.is_locked() {
            return Ok(());
        }

        if let Err(err) = self.lock_workspace().await {
            self.workspace.unlock().await?;
            return Err(err);
        }

        self.locked.store(true, Ordering::SeqCst);
        return Ok(());
    }

    async fn lock_workspace(&self) -> Result<()> {
        self.workspace.lock().await?;
        self.outbox.emit(Event::EditorsLocked())?;
        return Ok(());
    }

    pub async fn unlock(&self) -> Result<()> {
        self.workspace.unlock().await?;
        if self.locked.swap(false, Ordering::SeqCst) {
            tracing::info!("Editors unlocked");
        }
        return Ok(());
    }

    fn show(&self, message: FeedbackMessage) -> Result<()> {
        match message {
            FeedbackMessage::Test(feedback) => {
                if !feedback.submit {
                    self.outbox.emit(Event::Feedback(
                        feedback.test,
                        feedback.text.unwrap_or_default(),
                        feedback.success,
                    ))?;
                }
            }
            FeedbackMessage::Compile(feedback) => {
                self.outbox.emit(Event::Feedback(
                    OutputRegion::COMPILE.to_string(),
                    feedback.text.unwrap_or_default(),
                    feedback.success,
                ))?;
            }
        }

        self.outbox.scheduler().reset_indicators();
        return Ok(());
    }
}

#[async_trait]
impl TopicHandler for FeedbackDisplay {
    fn topics(&self) -> Vec<Topic> {
        return ChannelMode::Feedback.topics();
    }

    #[allow(clippy::implicit_return)]
    async fn handle(&self, topic: Topic, body: &str) -> Result<()> {
        match topic {
            Topic::Start => self.outbox.scheduler().reload(),
            Topic::Stop => self.lock().await?,
            _ => self.show(FeedbackMessage::decode(topic, body)?)?,
        }

        return Ok(());
    }
}

#[async_trait]
impl ActionHandler for FeedbackDisplay {
    #[allow(clippy::implicit_return)]
    async fn execute(&self, request: ControlRequest) -> Result<()> {
        if self.is_locked() {
            return Err(SyncError::Locked.into());
        }

        match request.action {
            ControlAction::Compile => {
                self.outbox.emit(Event::OutputsCleared())?;
                let sources = self.workspace.sources().await?;
                self.outbox.send(&Command::Compile { sources })?;
            }
            ControlAction::Test => {
                self.outbox.emit(Event::OutputsCleared())?;
                let sources = self.workspace.sources().await?;
                self.outbox.send(&Command::Test {
                    sources,
                    tests: request.tests,
                })?;
            }
            ControlAction::Submit => {
                // Locking makes the files read-only, collect them first.
                let sources = self.workspace.sources().await?;
                self.lock().await?;
                let sent = self.outbox.send(&Command::Submit { sources });
                if !matches!(sent, Ok(true)) {
                    // Nothing went out, editing goes on.
                    self.unlock().await?;
                }
                sent?;
            }
            action => return Err(SyncError::UnknownAction(action.to_string()).into()),
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn reload(&self) -> Result<()> {
        return self.unlock().await;
    }
}
