use async_trait::async_trait;

use super::SyncError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
}

impl ConfirmPrompt {
    pub fn new(title: &str, message: &str) -> ConfirmPrompt {
        return ConfirmPrompt {
            title: title.to_string(),
            message: message.to_string(),
        };
    }

    pub fn restart(assignment: &str) -> ConfirmPrompt {
        return ConfirmPrompt::new(
            "Restart assignment",
            &format!("Restart '{assignment}'? Scores and progress of this assignment are reset."),
        );
    }

    pub fn switch_now(assignment: &str) -> ConfirmPrompt {
        return ConfirmPrompt::new(
            "Start assignment now",
            &format!("Stop the running assignment and start '{assignment}' now?"),
        );
    }
}

/// Asks the user to confirm a destructive action. The answer is a deferred
/// value; a rejection resolves to `SyncError::UserCancelled`.
#[async_trait]
pub trait Confirmer {
    async fn confirm(&self, prompt: ConfirmPrompt) -> Result<(), SyncError>;
}

pub type ConfirmerBox = Box<dyn Confirmer + Send + Sync>;
