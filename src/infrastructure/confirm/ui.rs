#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::domain::models::ConfirmPrompt;
use crate::domain::models::Confirmer;
use crate::domain::models::Event;
use crate::domain::models::SyncError;

/// Hands the prompt to the terminal UI and waits for its modal to be
/// answered. A closed UI counts as a cancellation.
pub struct UiConfirmer {
    tx: mpsc::UnboundedSender<Event>,
}

impl UiConfirmer {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> UiConfirmer {
        return UiConfirmer { tx };
    }
}

#[async_trait]
impl Confirmer for UiConfirmer {
    #[allow(clippy::implicit_return)]
    async fn confirm(&self, prompt: ConfirmPrompt) -> Result<(), SyncError> {
        let (answer_tx, answer_rx) = oneshot::channel::<bool>();
        if self
            .tx
            .send(Event::ConfirmRequested(prompt, answer_tx))
            .is_err()
        {
            return Err(SyncError::UserCancelled);
        }

        match answer_rx.await {
            Ok(true) => return Ok(()),
            _ => return Err(SyncError::UserCancelled),
        }
    }
}
