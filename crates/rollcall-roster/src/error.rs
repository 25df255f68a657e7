use rollcall_types::ids::MessageRef;

use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Neither a fresh fetch nor the interaction carried the Event Message.
    #[error("event message {0} is unavailable")]
    MessageUnavailable(MessageRef),
}
