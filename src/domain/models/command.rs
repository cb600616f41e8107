#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

const CONTROL_PREFIX: &str = "/app/control";
const SUBMIT_PREFIX: &str = "/app/submit";

/// An editable file sent along with compile, test and submit requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub filename: String,
    pub content: String,
}

#[derive(Default, Serialize)]
struct TaskMessage {
    #[serde(rename = "taskName", skip_serializing_if = "Option::is_none")]
    task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uuid: Option<String>,
}

#[derive(Serialize)]
struct SourceMessage<'a> {
    sources: &'a [SourceFile],
    #[serde(skip_serializing_if = "Option::is_none")]
    tests: Option<&'a [String]>,
}

/// Outbound requests to the competition server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    StartTask {
        task_name: String,
    },
    StopTask {
        task_name: Option<String>,
    },
    RestartAssignment {
        task_name: String,
        value: Option<String>,
    },
    PauseResume,
    ClearCompetition,
    CompetitionCreateNew {
        name: String,
    },
    CompetitionDelete {
        uuid: String,
    },
    ScanAssignments,
    Compile {
        sources: Vec<SourceFile>,
    },
    Test {
        sources: Vec<SourceFile>,
        tests: Vec<String>,
    },
    Submit {
        sources: Vec<SourceFile>,
    },
}

impl Command {
    pub fn destination(&self) -> String {
        let path = match self {
            Command::StartTask { .. } => "starttask",
            Command::StopTask { .. } => "stoptask",
            Command::RestartAssignment { .. } => "restartAssignment",
            Command::PauseResume => "pauseResume",
            Command::ClearCompetition => "clearCompetition",
            Command::CompetitionCreateNew { .. } => "competitionCreateNew",
            Command::CompetitionDelete { .. } => "competitionDelete",
            Command::ScanAssignments => "assignment/scan",
            Command::Compile { .. } => return format!("{SUBMIT_PREFIX}/compile"),
            Command::Test { .. } => return format!("{SUBMIT_PREFIX}/test"),
            Command::Submit { .. } => return format!("{SUBMIT_PREFIX}/submit"),
        };

        return format!("{CONTROL_PREFIX}/{path}");
    }

    /// JSON body of the SEND frame.
    pub fn payload(&self) -> Result<String> {
        let task = match self {
            Command::StartTask { task_name } => TaskMessage {
                task_name: Some(task_name.to_string()),
                ..TaskMessage::default()
            },
            Command::StopTask { task_name } => TaskMessage {
                task_name: task_name.clone(),
                ..TaskMessage::default()
            },
            Command::RestartAssignment { task_name, value } => TaskMessage {
                task_name: Some(task_name.to_string()),
                value: value.clone(),
                ..TaskMessage::default()
            },
            Command::PauseResume | Command::ClearCompetition | Command::ScanAssignments => {
                TaskMessage::default()
            }
            Command::CompetitionCreateNew { name } => TaskMessage {
                task_name: Some("competitionCreateNew".to_string()),
                value: Some(name.to_string()),
                ..TaskMessage::default()
            },
            Command::CompetitionDelete { uuid } => TaskMessage {
                task_name: Some("competitionDelete".to_string()),
                uuid: Some(uuid.to_string()),
                ..TaskMessage::default()
            },
            Command::Compile { sources } | Command::Submit { sources } => {
                return Ok(serde_json::to_string(&SourceMessage {
                    sources,
                    tests: None,
                })?);
            }
            Command::Test { sources, tests } => {
                return Ok(serde_json::to_string(&SourceMessage {
                    sources,
                    tests: Some(tests.as_slice()),
                })?);
            }
        };

        return Ok(serde_json::to_string(&task)?);
    }
}
