//! Inbound interaction payloads.
//!
//! Slack posts a loosely shaped `block_actions` body where almost every field
//! is optional. [`RawInteraction`] mirrors that shape; [`Interaction::from_raw`]
//! validates it into the two shapes the roster handlers accept.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::ids::{ChannelId, MessageRef, MessageTs, UserId};
use crate::slack::{COMMIT_ACTION_ID, SlackMessage, UNCOMMIT_ACTION_ID};

#[derive(Debug, Clone, Deserialize)]
pub struct RawInteraction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub channel: Option<RawChannel>,
    #[serde(default)]
    pub container: Option<RawContainer>,
    #[serde(default)]
    pub message: Option<SlackMessage>,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawChannel {
    pub id: ChannelId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawContainer {
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    #[serde(default)]
    pub message_ts: Option<MessageTs>,
    #[serde(default)]
    pub is_ephemeral: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAction {
    pub action_id: String,
    #[serde(default)]
    pub block_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Value carried by the "uncommit" button so the follow-up interaction can
/// find the Event Message it refers to. Fields are optional on the way in
/// because older buttons may carry partial values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<MessageTs>,
}

impl ActionPayload {
    pub fn for_message(target: &MessageRef) -> Self {
        Self {
            channel: Some(target.channel.clone()),
            ts: Some(target.ts.clone()),
        }
    }

    /// JSON form stored in the button's `value`.
    pub fn encode(&self) -> String {
        json!({ "channel": self.channel, "ts": self.ts }).to_string()
    }

    /// Lenient decode: an unparsable value yields an empty payload.
    pub fn decode(value: &str) -> Self {
        serde_json::from_str(value).unwrap_or_else(|e| {
            warn!("Ignoring unparsable action payload '{}': {}", value, e);
            Self::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitInteraction {
    pub user: UserId,
    pub target: MessageRef,
    /// Copy of the Event Message as displayed when the button was pressed.
    pub message: Option<SlackMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UncommitInteraction {
    pub user: UserId,
    /// The Event Message named by the action payload, with gaps filled from
    /// the surrounding context. `None` when it can't be resolved.
    pub target: Option<MessageRef>,
    /// Where to send a notice when `target` is unresolved.
    pub reply_channel: Option<ChannelId>,
    /// Message the button lived on. Only usable as a fallback when it is the
    /// Event Message itself.
    pub message: Option<SlackMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Commit(CommitInteraction),
    Uncommit(UncommitInteraction),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("interaction has no acting user")]
    MissingUser,
    #[error("commit interaction has no channel")]
    MissingChannel,
    #[error("commit interaction has no message timestamp")]
    MissingMessage,
}

impl Interaction {
    /// Validate a raw payload. Returns `Ok(None)` for payloads that aren't
    /// roster interactions, such as other block actions or view submissions.
    pub fn from_raw(raw: RawInteraction) -> Result<Option<Self>, InteractionError> {
        if raw.kind != "block_actions" {
            return Ok(None);
        }

        let Some(action) = raw
            .actions
            .iter()
            .find(|a| a.action_id == COMMIT_ACTION_ID || a.action_id == UNCOMMIT_ACTION_ID)
        else {
            return Ok(None);
        };

        let user = raw.user.as_ref().ok_or(InteractionError::MissingUser)?.id.clone();
        let context_channel = raw
            .channel
            .as_ref()
            .map(|c| c.id.clone())
            .or_else(|| raw.container.as_ref().and_then(|c| c.channel_id.clone()));
        let context_ts = raw
            .message
            .as_ref()
            .and_then(|m| m.ts.clone())
            .or_else(|| raw.container.as_ref().and_then(|c| c.message_ts.clone()));

        if action.action_id == COMMIT_ACTION_ID {
            let channel = context_channel.ok_or(InteractionError::MissingChannel)?;
            let ts = context_ts.ok_or(InteractionError::MissingMessage)?;
            return Ok(Some(Self::Commit(CommitInteraction {
                user,
                target: MessageRef::new(channel, ts),
                message: raw.message,
            })));
        }

        let payload = action
            .value
            .as_deref()
            .map(ActionPayload::decode)
            .unwrap_or_default();
        let channel = payload.channel.or_else(|| context_channel.clone());
        let ts = payload.ts.or(context_ts);
        let target = match (channel, ts) {
            (Some(channel), Some(ts)) => Some(MessageRef::new(channel, ts)),
            _ => None,
        };

        Ok(Some(Self::Uncommit(UncommitInteraction {
            user,
            target,
            reply_channel: context_channel,
            message: raw.message,
        })))
    }

    pub fn user(&self) -> &UserId {
        match self {
            Self::Commit(c) => &c.user,
            Self::Uncommit(u) => &u.user,
        }
    }
}
