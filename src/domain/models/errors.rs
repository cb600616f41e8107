use thiserror::Error;

/// Failures surfaced to the user at the UI boundary. None of these end the
/// process: they turn into a notice, a resynchronization, or nothing at all.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// A command was sent while the control channel was down.
    #[error("Your connection has expired, reloading.")]
    ConnectionLost,

    /// A command that needs a selected assignment was issued without one.
    #[error("No assignment selected")]
    NoSelection,

    /// The user dismissed a confirmation. Never shown as a notice.
    #[error("Cancelled by user")]
    UserCancelled,

    /// An HTTP side-channel request did not succeed.
    #[error("Unable to {action}.")]
    ServerRejected { action: String },

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Invalid action identifier '{0}', only word characters are allowed")]
    InvalidIdentifier(String),

    #[error("Key '{0}' is bound more than once")]
    DuplicateBinding(char),

    /// The submission was finalized, editors are read-only for good.
    #[error("Your solution has been submitted, editing is disabled.")]
    Locked,
}

impl SyncError {
    /// Cancellations are a normal outcome and stay silent.
    pub fn is_silent(&self) -> bool {
        return *self == SyncError::UserCancelled;
    }
}
