#[cfg(test)]
#[path = "assignment_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Command;
use super::SyncError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub total_time_seconds: u64,
    #[serde(default)]
    pub remaining_time_seconds: u64,
    #[serde(default)]
    pub completed: bool,
}

impl Assignment {
    pub fn new(name: &str, total_time_seconds: u64) -> Assignment {
        return Assignment {
            id: name.to_string(),
            name: name.to_string(),
            total_time_seconds,
            remaining_time_seconds: total_time_seconds,
            completed: false,
        };
    }

    /// Snapshots may omit ids, in which case the name identifies the
    /// assignment.
    pub fn identity(&self) -> &str {
        if self.id.is_empty() {
            return &self.name;
        }

        return &self.id;
    }
}

/// A running assessment period, mirrored from the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub active_assignment_id: Option<String>,
    #[serde(default)]
    pub running: bool,
}

/// What `startTask` resolves to once selection and session are known.
#[derive(Debug, PartialEq, Eq)]
pub enum StartPlan {
    /// Nothing is running: start the selection right away.
    Start(Command),
    /// The selection is already running or completed.
    ConfirmRestart(Command),
    /// Another assignment is running. Stopping it makes the server start the
    /// selected one.
    ConfirmSwitch(Command),
}

/// The user's view at the moment an action is triggered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionView {
    pub session: Session,
    pub selected: Option<Assignment>,
}

impl SessionView {
    pub fn selected(&self) -> Result<&Assignment, SyncError> {
        return self.selected.as_ref().ok_or(SyncError::NoSelection);
    }

    pub fn is_running(&self) -> bool {
        return self.session.running;
    }

    fn active_assignment(&self) -> Option<&str> {
        if !self.is_running() {
            return None;
        }

        return self.session.active_assignment_id.as_deref();
    }

    pub fn plan_start(&self) -> Result<StartPlan, SyncError> {
        let selected = self.selected()?;
        let task_name = selected.name.to_string();

        if !self.is_running() && !selected.completed {
            return Ok(StartPlan::Start(Command::StartTask { task_name }));
        }

        if self.active_assignment() == Some(selected.identity()) || selected.completed {
            return Ok(StartPlan::ConfirmRestart(Command::RestartAssignment {
                task_name: task_name.to_string(),
                value: Some(task_name),
            }));
        }

        return Ok(StartPlan::ConfirmSwitch(Command::StopTask {
            task_name: Some(task_name),
        }));
    }
}
