//! In-process [`ChatPlatform`] used when no bot token is configured and by
//! tests. Messages live in a map; every call is recorded.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use rollcall_types::ids::{ChannelId, MessageRef, MessageTs};
use rollcall_types::slack::{EphemeralNotice, MessageUpdate, NewMessage, SlackMessage};

use crate::platform::{ChatPlatform, PlatformError};

#[derive(Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
    fail_fetch: AtomicBool,
    fail_update: AtomicBool,
}

#[derive(Default)]
struct MemoryState {
    messages: HashMap<MessageRef, SlackMessage>,
    /// Messages `fetch_message` pretends not to see.
    hidden: Vec<MessageRef>,
    /// Channels `post_message` refuses.
    rejected: Vec<ChannelId>,
    next_ts: u64,
    posted: Vec<NewMessage>,
    updates: Vec<MessageUpdate>,
    ephemerals: Vec<EphemeralNotice>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores `message` in `channel` as if it had been posted, returning its
    /// location.
    pub fn seed(&self, channel: &ChannelId, mut message: SlackMessage) -> MessageRef {
        let mut state = self.state();
        let ts = state.allocate_ts();
        message.ts = Some(ts.clone());
        let target = MessageRef::new(channel.clone(), ts);
        state.messages.insert(target.clone(), message);
        target
    }

    pub fn message(&self, target: &MessageRef) -> Option<SlackMessage> {
        self.state().messages.get(target).cloned()
    }

    /// Replaces a stored message without recording an update, simulating an
    /// edit made elsewhere.
    pub fn overwrite(&self, target: &MessageRef, message: SlackMessage) {
        self.state().messages.insert(target.clone(), message);
    }

    pub fn hide(&self, target: &MessageRef) {
        self.state().hidden.push(target.clone());
    }

    pub fn reject_channel(&self, channel: &ChannelId) {
        self.state().rejected.push(channel.clone());
    }

    pub fn posted(&self) -> Vec<NewMessage> {
        self.state().posted.clone()
    }

    pub fn updates(&self) -> Vec<MessageUpdate> {
        self.state().updates.clone()
    }

    pub fn ephemerals(&self) -> Vec<EphemeralNotice> {
        self.state().ephemerals.clone()
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }
}

impl MemoryState {
    fn allocate_ts(&mut self) -> MessageTs {
        self.next_ts += 1;
        MessageTs::new(format!("1700000000.{:06}", self.next_ts))
    }
}

impl ChatPlatform for MemoryPlatform {
    async fn post_message(&self, message: NewMessage) -> Result<MessageTs, PlatformError> {
        let mut state = self.state();
        if state.rejected.contains(&message.channel) {
            return Err(PlatformError::api("chat.postMessage", "channel_not_found"));
        }
        let ts = state.allocate_ts();
        debug!("memory post to {} at {}", message.channel, ts);
        state.messages.insert(
            MessageRef::new(message.channel.clone(), ts.clone()),
            SlackMessage {
                ts: Some(ts.clone()),
                text: Some(message.text.clone()),
                blocks: message.blocks.clone(),
            },
        );
        state.posted.push(message);
        Ok(ts)
    }

    async fn update_message(&self, update: MessageUpdate) -> Result<(), PlatformError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(PlatformError::api("chat.update", "ratelimited"));
        }

        let mut state = self.state();
        let target = MessageRef::new(update.channel.clone(), update.ts.clone());
        let Some(stored) = state.messages.get_mut(&target) else {
            return Err(PlatformError::api("chat.update", "message_not_found"));
        };
        stored.text = Some(update.text.clone());
        stored.blocks = update.blocks.clone();
        state.updates.push(update);
        Ok(())
    }

    async fn post_ephemeral(&self, notice: EphemeralNotice) -> Result<(), PlatformError> {
        debug!("memory ephemeral to {}: {}", notice.user, notice.text);
        self.state().ephemerals.push(notice);
        Ok(())
    }

    async fn fetch_message(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> Result<Option<SlackMessage>, PlatformError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(PlatformError::api("conversations.history", "missing_scope"));
        }

        let state = self.state();
        let target = MessageRef::new(channel.clone(), ts.clone());
        if state.hidden.contains(&target) {
            return Ok(None);
        }
        Ok(state.messages.get(&target).cloned())
    }
}
