use std::future::Future;

use rollcall_types::ids::{ChannelId, MessageTs};
use rollcall_types::slack::{EphemeralNotice, MessageUpdate, NewMessage, SlackMessage};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform answered but refused the call, e.g. `missing_scope` or
    /// `ratelimited`.
    #[error("{method} failed: {error}")]
    Api { method: String, error: String },

    /// The call never got a usable answer.
    #[error("{method} transport error: {message}")]
    Transport { method: String, message: String },
}

impl PlatformError {
    pub fn api(method: &str, error: impl Into<String>) -> Self {
        Self::Api {
            method: method.to_string(),
            error: error.into(),
        }
    }

    pub fn transport(method: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            method: method.to_string(),
            message: message.into(),
        }
    }
}

/// The chat platform operations the bot depends on. The platform owns every
/// Event Message; `update_message` is a full overwrite and the only mutation.
pub trait ChatPlatform: Send + Sync + 'static {
    fn post_message(
        &self,
        message: NewMessage,
    ) -> impl Future<Output = Result<MessageTs, PlatformError>> + Send;

    fn update_message(
        &self,
        update: MessageUpdate,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    fn post_ephemeral(
        &self,
        notice: EphemeralNotice,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Best-effort re-read. `Ok(None)` when the message isn't visible to us.
    fn fetch_message(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> impl Future<Output = Result<Option<SlackMessage>, PlatformError>> + Send;
}
