//! Ephemeral notices sent back to the acting user.

use rollcall_types::ids::{ChannelId, MessageRef, UserId};
use rollcall_types::interaction::ActionPayload;
use rollcall_types::slack::{Block, Button, EphemeralNotice, UNCOMMIT_ACTION_ID};

pub const DENIED: &str = "Sorry, you can't commit to events from this account.";
pub const ALREADY_COMMITTED: &str = "You are already committed to this event.";
pub const COMMITTED: &str = "You committed to this event!";
pub const UNRESOLVABLE: &str = "Could not locate the event message.";
pub const MISSING_ROSTER: &str = "No commit list found on the message.";
pub const NOT_COMMITTED: &str = "You are not committed to this event.";
pub const UNCOMMITTED: &str = "You have been uncommitted from this event.";

pub fn text(channel: &ChannelId, user: &UserId, text: &str) -> EphemeralNotice {
    EphemeralNotice {
        channel: channel.clone(),
        user: user.clone(),
        text: text.to_string(),
        blocks: Vec::new(),
    }
}

/// Notice with an "Uncommit" button pointing back at `target`.
pub fn with_uncommit(target: &MessageRef, user: &UserId, text: &str) -> EphemeralNotice {
    let button = Button::new("Uncommit", UNCOMMIT_ACTION_ID)
        .with_style("danger")
        .with_value(ActionPayload::for_message(target).encode());

    EphemeralNotice {
        channel: target.channel.clone(),
        user: user.clone(),
        text: text.to_string(),
        blocks: vec![Block::section(text), Block::actions(vec![button])],
    }
}
