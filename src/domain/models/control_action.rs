#[cfg(test)]
#[path = "control_action_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::str::FromStr;

use strum::EnumIter;
use strum::EnumString;
use strum::EnumVariantNames;

use super::SessionView;
use super::SyncError;

/// User-triggered actions, addressed by their declared identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumString, EnumVariantNames, strum::Display,
)]
#[strum(serialize_all = "camelCase")]
pub enum ControlAction {
    StartTask,
    StopTask,
    RestartAssignment,
    PauseResume,
    ClearCompetition,
    CompetitionCreateNew,
    CompetitionDelete,
    ScanAssignments,
    Compile,
    Test,
    Submit,
}

impl ControlAction {
    /// Resolves a declared identifier. Identifiers are never evaluated, only
    /// looked up.
    pub fn parse(identifier: &str) -> Result<ControlAction, SyncError> {
        let valid = !identifier.is_empty()
            && identifier
                .chars()
                .all(|e| return e.is_ascii_alphanumeric() || e == '_');
        if !valid {
            return Err(SyncError::InvalidIdentifier(identifier.to_string()));
        }

        return ControlAction::from_str(identifier)
            .map_err(|_| return SyncError::UnknownAction(identifier.to_string()));
    }

    /// Actions that ask the user for a free text argument first.
    pub fn needs_argument(&self) -> bool {
        return matches!(
            self,
            ControlAction::CompetitionCreateNew | ControlAction::CompetitionDelete
        );
    }
}

/// Everything an action needs at the moment it is triggered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlRequest {
    pub action: ControlAction,
    pub view: SessionView,
    pub argument: Option<String>,
    pub tests: Vec<String>,
}

impl ControlRequest {
    pub fn new(action: ControlAction, view: SessionView) -> ControlRequest {
        return ControlRequest {
            action,
            view,
            argument: None,
            tests: vec![],
        };
    }
}

/// Maps keys to actions. Every binding is validated when registered.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    bindings: BTreeMap<char, ControlAction>,
}

impl ActionRegistry {
    pub const CONTROL_KEYMAP: &'static str = "s=startTask,x=stopTask,r=restartAssignment,p=pauseResume,c=clearCompetition,n=competitionCreateNew,d=competitionDelete,a=scanAssignments";
    pub const FEEDBACK_KEYMAP: &'static str = "c=compile,t=test,u=submit";

    pub fn register(&mut self, key: char, identifier: &str) -> Result<(), SyncError> {
        let action = ControlAction::parse(identifier)?;
        if self.bindings.contains_key(&key) {
            return Err(SyncError::DuplicateBinding(key));
        }

        self.bindings.insert(key, action);
        return Ok(());
    }

    /// Parses a `key=action,key=action` list.
    pub fn from_keymap(keymap: &str) -> Result<ActionRegistry, SyncError> {
        let mut registry = ActionRegistry::default();
        for entry in keymap.split(',').map(|e| return e.trim()) {
            if entry.is_empty() {
                continue;
            }

            let (key, identifier) = entry
                .split_once('=')
                .ok_or_else(|| return SyncError::InvalidIdentifier(entry.to_string()))?;

            let mut chars = key.trim().chars();
            let key_char = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(SyncError::InvalidIdentifier(entry.to_string())),
            };

            registry.register(key_char, identifier.trim())?;
        }

        return Ok(registry);
    }

    pub fn resolve(&self, key: char) -> Option<ControlAction> {
        return self.bindings.get(&key).copied();
    }

    /// One line per binding, for the help bar.
    pub fn describe(&self) -> Vec<String> {
        return self
            .bindings
            .iter()
            .map(|(key, action)| return format!("{key} {action}"))
            .collect();
    }
}
