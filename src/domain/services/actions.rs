#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::ActionHandlerBox;
use crate::domain::models::ChannelBox;
use crate::domain::models::ControlRequest;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::SyncError;

/// Turns a failed action into what the user gets to see, if anything.
pub fn failure_notice(err: &anyhow::Error) -> Option<Notice> {
    if let Some(sync_err) = err.downcast_ref::<SyncError>() {
        if sync_err.is_silent() {
            return None;
        }
        return Some(Notice::alert(&sync_err.to_string()));
    }

    return Some(Notice::alert(&format!("{err}")));
}

async fn run_request(
    handler: &ActionHandlerBox,
    tx: &mpsc::UnboundedSender<Event>,
    request: ControlRequest,
) -> Result<()> {
    let action = request.action;
    if let Err(err) = handler.execute(request).await {
        tracing::debug!(%action, error = ?err, "Action failed");
        if let Some(notice) = failure_notice(&err) {
            tx.send(Event::Notice(notice))?;
        }
    }

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        handler: ActionHandlerBox,
        channel: ChannelBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            match action {
                Action::Control(request) => {
                    run_request(&handler, &tx, request).await?;
                }
                Action::Resynchronize() => {
                    if let Err(err) = handler.reload().await {
                        tracing::error!(error = ?err, "Unable to reset after reload");
                        if let Some(notice) = failure_notice(&err) {
                            tx.send(Event::Notice(notice))?;
                        }
                    }
                    channel.resynchronize();
                }
            }
        }

        return Ok(());
    }
}
