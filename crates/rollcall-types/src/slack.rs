//! Slack Block Kit and message shapes.
//!
//! Only the fields the bot reads or writes are typed. Everything else a block
//! carries is kept in `extra` so a message survives a read/rewrite cycle
//! without losing fields we don't model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{ChannelId, MessageTs, UserId};

/// `block_id` of the section holding the roster line.
pub const COMMITS_BLOCK_ID: &str = "commits";

/// `action_id` of the button on each Event Message.
pub const COMMIT_ACTION_ID: &str = "commit_event";

/// `action_id` of the button on the private confirmation.
pub const UNCOMMIT_ACTION_ID: &str = "uncommit_event";

/// `event_type` of the metadata attached to every roster rewrite.
pub const COMMIT_UPDATE_EVENT: &str = "commit_update";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn".into(),
            text: text.into(),
            extra: Map::new(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: "plain_text".into(),
            text: text.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: TextObject,
    pub action_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Button {
    pub fn new(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            kind: "button".into(),
            text: TextObject::plain(label),
            action_id: action_id.into(),
            value: None,
            style: None,
            extra: Map::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// An element inside an `actions` or `context` block, or a section accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockElement {
    Button(Button),
    Text(TextObject),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<BlockElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<BlockElement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn section(text: impl Into<String>) -> Self {
        Self {
            kind: "section".into(),
            block_id: None,
            text: Some(TextObject::mrkdwn(text)),
            accessory: None,
            elements: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn actions(buttons: Vec<Button>) -> Self {
        Self {
            kind: "actions".into(),
            block_id: None,
            text: None,
            accessory: None,
            elements: buttons.into_iter().map(BlockElement::Button).collect(),
            extra: Map::new(),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Self {
            kind: "context".into(),
            block_id: None,
            text: None,
            accessory: None,
            elements: vec![BlockElement::Text(TextObject::mrkdwn(text))],
            extra: Map::new(),
        }
    }

    pub fn with_block_id(mut self, id: impl Into<String>) -> Self {
        self.block_id = Some(id.into());
        self
    }

    pub fn with_accessory(mut self, button: Button) -> Self {
        self.accessory = Some(BlockElement::Button(button));
        self
    }
}

/// A message as returned by `conversations.history` or embedded in an
/// interaction payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<MessageTs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl SlackMessage {
    /// Index of the block carrying the roster line.
    pub fn commits_block_index(&self) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.block_id.as_deref() == Some(COMMITS_BLOCK_ID))
    }
}

/// `chat.postMessage` request.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub channel: ChannelId,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

impl NewMessage {
    pub fn new(channel: ChannelId, text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            channel,
            text: text.into(),
            blocks,
            unfurl_links: false,
            unfurl_media: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitUpdatePayload {
    pub updated_at: i64,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub event_type: String,
    pub event_payload: CommitUpdatePayload,
}

impl MessageMetadata {
    pub fn commit_update(updated_at: i64, user_id: UserId) -> Self {
        Self {
            event_type: COMMIT_UPDATE_EVENT.into(),
            event_payload: CommitUpdatePayload {
                updated_at,
                user_id,
            },
        }
    }
}

/// `chat.update` request. Slack has no partial patch, so this always carries
/// the full text and blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageUpdate {
    pub channel: ChannelId,
    pub ts: MessageTs,
    pub text: String,
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

/// `chat.postEphemeral` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EphemeralNotice {
    pub channel: ChannelId,
    pub user: UserId,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}
