use super::ActionRegistry;
use super::ControlAction;
use crate::domain::models::SyncError;

#[test]
fn it_parses_declared_identifiers() {
    assert_eq!(ControlAction::parse("startTask"), Ok(ControlAction::StartTask));
    assert_eq!(
        ControlAction::parse("competitionCreateNew"),
        Ok(ControlAction::CompetitionCreateNew)
    );
}

#[test]
fn it_rejects_unknown_identifiers() {
    assert_eq!(
        ControlAction::parse("launchMissiles"),
        Err(SyncError::UnknownAction("launchMissiles".to_string()))
    );
}

#[test]
fn it_rejects_expressions() {
    assert_eq!(
        ControlAction::parse("alert(1)"),
        Err(SyncError::InvalidIdentifier("alert(1)".to_string()))
    );
}

#[test]
fn it_builds_default_keymaps() {
    let control = ActionRegistry::from_keymap(ActionRegistry::CONTROL_KEYMAP).unwrap();
    assert_eq!(control.resolve('s'), Some(ControlAction::StartTask));
    assert_eq!(control.resolve('a'), Some(ControlAction::ScanAssignments));
    assert_eq!(control.resolve('z'), None);

    let feedback = ActionRegistry::from_keymap(ActionRegistry::FEEDBACK_KEYMAP).unwrap();
    assert_eq!(feedback.resolve('u'), Some(ControlAction::Submit));
}

#[test]
fn it_rejects_duplicate_keys() {
    let res = ActionRegistry::from_keymap("s=startTask, s=stopTask");
    assert_eq!(res.unwrap_err(), SyncError::DuplicateBinding('s'));
}

#[test]
fn it_rejects_unknown_actions_at_registration() {
    let mut registry = ActionRegistry::default();
    let res = registry.register('q', "quitEverything");

    assert_eq!(res, Err(SyncError::UnknownAction("quitEverything".to_string())));
    assert_eq!(registry.resolve('q'), None);
}

#[test]
fn it_rejects_malformed_entries() {
    assert!(ActionRegistry::from_keymap("startTask").is_err());
    assert!(ActionRegistry::from_keymap("st=startTask").is_err());
}

#[test]
fn it_describes_bindings_in_key_order() {
    let registry = ActionRegistry::from_keymap("x=stopTask,p=pauseResume").unwrap();
    assert_eq!(registry.describe(), vec!["p pauseResume", "x stopTask"]);
}

#[test]
fn it_flags_actions_with_arguments() {
    assert!(ControlAction::CompetitionDelete.needs_argument());
    assert!(!ControlAction::StartTask.needs_argument());
}
