use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use tokio::task;

use crate::domain::models::ConfirmPrompt;
use crate::domain::models::Confirmer;
use crate::domain::models::SyncError;

/// Asks on stdin, for the one-shot CLI commands.
#[derive(Default)]
pub struct TerminalConfirmer {}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    #[allow(clippy::implicit_return)]
    async fn confirm(&self, prompt: ConfirmPrompt) -> Result<(), SyncError> {
        let res = task::spawn_blocking(move || {
            return Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt.message)
                .default(false)
                .interact_opt();
        })
        .await;

        match res {
            Ok(Ok(Some(true))) => return Ok(()),
            Ok(Ok(_)) => return Err(SyncError::UserCancelled),
            Ok(Err(err)) => {
                tracing::error!(error = ?err, "Confirmation prompt failed");
                return Err(SyncError::UserCancelled);
            }
            Err(err) => {
                tracing::error!(error = ?err, "Confirmation prompt failed");
                return Err(SyncError::UserCancelled);
            }
        }
    }
}
