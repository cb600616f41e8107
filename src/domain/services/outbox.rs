use anyhow::Result;
use tokio::sync::mpsc;

use super::Scheduler;
use crate::domain::models::ChannelBox;
use crate::domain::models::Command;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::SyncError;

/// Outbound half shared by the topic handlers: commands go to the channel,
/// everything else to the UI.
#[derive(Clone)]
pub struct Outbox {
    channel: ChannelBox,
    tx: mpsc::UnboundedSender<Event>,
    scheduler: Scheduler,
}

impl Outbox {
    pub fn new(
        channel: ChannelBox,
        tx: mpsc::UnboundedSender<Event>,
        scheduler: Scheduler,
    ) -> Outbox {
        return Outbox {
            channel,
            tx,
            scheduler,
        };
    }

    pub fn scheduler(&self) -> &Scheduler {
        return &self.scheduler;
    }

    pub fn emit(&self, event: Event) -> Result<()> {
        self.tx.send(event)?;
        return Ok(());
    }

    pub fn notify(&self, notice: Notice) -> Result<()> {
        return self.emit(Event::Notice(notice));
    }

    /// Publishes a command while the channel is live. Otherwise the user is
    /// told their connection expired and a reload is scheduled; that is not
    /// an error. Returns whether the command went out.
    pub fn send(&self, command: &Command) -> Result<bool> {
        if self.channel.is_connected() {
            let destination = command.destination();
            let res = self.channel.publish(&destination, &command.payload()?);
            match res {
                Ok(()) => {
                    tracing::info!(destination, "Command sent");
                    return Ok(true);
                }
                Err(err) => {
                    if err.downcast_ref::<SyncError>() != Some(&SyncError::ConnectionLost) {
                        return Err(err);
                    }
                }
            }
        }

        tracing::warn!(destination = command.destination(), "Command dropped, channel is down");
        self.notify(Notice::alert(&SyncError::ConnectionLost.to_string()))?;
        self.scheduler.reload();

        return Ok(false);
    }
}
