use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::failure_notice;
use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::ActionHandler;
use crate::domain::models::ActionHandlerBox;
use crate::domain::models::ChannelBox;
use crate::domain::models::ControlAction;
use crate::domain::models::ControlRequest;
use crate::domain::models::Event;
use crate::domain::models::NoticeKind;
use crate::domain::models::SessionView;
use crate::domain::models::SyncError;
use crate::domain::services::fakes::drain;
use crate::domain::services::fakes::notices;
use crate::domain::services::fakes::RecordingChannel;

struct ScriptedHandler {
    seen: Arc<Mutex<Vec<ControlAction>>>,
}

#[async_trait]
impl ActionHandler for ScriptedHandler {
    #[allow(clippy::implicit_return)]
    async fn execute(&self, request: ControlRequest) -> Result<()> {
        self.seen.lock().unwrap().push(request.action);
        match request.action {
            ControlAction::StopTask => return Err(SyncError::NoSelection.into()),
            ControlAction::RestartAssignment => return Err(SyncError::UserCancelled.into()),
            ControlAction::ScanAssignments => bail!("Scanner exploded"),
            _ => return Ok(()),
        }
    }
}

struct StuckWorkspace {}

#[async_trait]
impl ActionHandler for StuckWorkspace {
    #[allow(clippy::implicit_return)]
    async fn execute(&self, _request: ControlRequest) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn reload(&self) -> Result<()> {
        bail!("Permission denied");
    }
}

fn request(action: ControlAction) -> Action {
    return Action::Control(ControlRequest::new(action, SessionView::default()));
}

#[test]
fn it_keeps_cancellations_silent() -> Result<()> {
    assert!(failure_notice(&SyncError::UserCancelled.into()).is_none());

    let notice = failure_notice(&SyncError::NoSelection.into()).unwrap();
    assert_eq!(notice.kind, NoticeKind::Alert);
    assert_eq!(notice.text, "No assignment selected");

    return Ok(());
}

#[tokio::test]
async fn it_runs_actions_in_order_and_reports_failures() -> Result<()> {
    let seen = Arc::new(Mutex::new(vec![]));
    let handler: ActionHandlerBox = Arc::new(ScriptedHandler { seen: seen.clone() });
    let recording = RecordingChannel::new(true);
    let channel: ChannelBox = recording.clone();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    action_tx.send(request(ControlAction::StartTask))?;
    action_tx.send(request(ControlAction::StopTask))?;
    action_tx.send(request(ControlAction::RestartAssignment))?;
    action_tx.send(request(ControlAction::ScanAssignments))?;
    action_tx.send(Action::Resynchronize())?;
    drop(action_tx);

    ActionsService::start(handler, channel, event_tx, &mut action_rx).await?;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ControlAction::StartTask,
            ControlAction::StopTask,
            ControlAction::RestartAssignment,
            ControlAction::ScanAssignments,
        ]
    );
    assert_eq!(
        notices(&drain(&mut event_rx)),
        vec!["No assignment selected", "Scanner exploded"]
    );
    assert_eq!(recording.resyncs(), 1);

    return Ok(());
}

#[tokio::test]
async fn it_resynchronizes_even_when_the_reload_hook_fails() -> Result<()> {
    let handler: ActionHandlerBox = Arc::new(StuckWorkspace {});
    let recording = RecordingChannel::new(true);
    let channel: ChannelBox = recording.clone();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    action_tx.send(Action::Resynchronize())?;
    drop(action_tx);

    ActionsService::start(handler, channel, event_tx, &mut action_rx).await?;

    assert_eq!(notices(&drain(&mut event_rx)), vec!["Permission denied"]);
    assert_eq!(recording.resyncs(), 1);

    return Ok(());
}
