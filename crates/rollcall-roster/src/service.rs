use std::sync::Arc;

use tracing::{debug, error, info, warn};

use rollcall_types::ids::{MessageRef, UserId};
use rollcall_types::interaction::Interaction;
use rollcall_types::slack::{MessageMetadata, MessageUpdate, SlackMessage};

use crate::commit::CommitOutcome;
use crate::deny_list::DenyList;
use crate::error::RosterError;
use crate::locks::EditLocks;
use crate::platform::ChatPlatform;
use crate::revision::RevisionClock;
use crate::roster::Roster;

/// Fallback top-level text when the Event Message has none.
const DEFAULT_MESSAGE_TEXT: &str = "Event update";

/// Everything the commit/uncommit handlers share. Built once at startup.
pub struct RosterService<P> {
    pub(crate) platform: Arc<P>,
    pub(crate) deny_list: DenyList,
    pub(crate) locks: EditLocks,
    pub(crate) clock: RevisionClock,
}

impl<P: ChatPlatform> RosterService<P> {
    pub fn new(platform: Arc<P>, deny_list: DenyList) -> Self {
        Self {
            platform,
            deny_list,
            locks: EditLocks::new(),
            clock: RevisionClock::new(),
        }
    }

    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    pub fn deny_list(&self) -> &DenyList {
        &self.deny_list
    }

    /// Runs the handler for `interaction`. Failures end here: they are logged
    /// and the user simply gets no confirmation.
    pub async fn dispatch(&self, interaction: Interaction) {
        let user = interaction.user().clone();
        match interaction {
            Interaction::Commit(commit) => {
                let target = commit.target.clone();
                match self.handle_commit(commit).await {
                    Ok(CommitOutcome::Denied) => debug!("commit by {} on {} denied", user, target),
                    Ok(outcome) => info!("commit by {} on {}: {:?}", user, target, outcome),
                    Err(e) => error!("commit by {} on {} failed: {}", user, target, e),
                }
            }
            Interaction::Uncommit(uncommit) => match self.handle_uncommit(uncommit).await {
                Ok(outcome) => info!("uncommit by {}: {:?}", user, outcome),
                Err(e) => error!("uncommit by {} failed: {}", user, e),
            },
        }
    }

    /// Current content of the Event Message. Prefers a fresh read; falls back
    /// to the copy the interaction carried when the read fails or comes back
    /// empty (e.g. missing history scope).
    pub(crate) async fn resolve_message(
        &self,
        target: &MessageRef,
        fallback: Option<SlackMessage>,
    ) -> Result<SlackMessage, RosterError> {
        match self.platform.fetch_message(&target.channel, &target.ts).await {
            Ok(Some(message)) => return Ok(message),
            Ok(None) => warn!("{} not returned by fetch, using interaction copy", target),
            Err(e) => warn!("fetching {} failed, using interaction copy: {}", target, e),
        }

        fallback.ok_or_else(|| RosterError::MessageUnavailable(target.clone()))
    }

    /// Writes `roster` into the commits block of `message` and overwrites the
    /// Event Message with the result.
    pub(crate) async fn persist(
        &self,
        target: &MessageRef,
        mut message: SlackMessage,
        block_index: usize,
        roster: &Roster,
        user: &UserId,
    ) -> Result<(), RosterError> {
        if let Some(text) = message.blocks[block_index].text.as_mut() {
            text.text = roster.rewrite(&text.text);
        }

        let update = MessageUpdate {
            channel: target.channel.clone(),
            ts: target.ts.clone(),
            text: message
                .text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_MESSAGE_TEXT.to_string()),
            blocks: message.blocks,
            metadata: Some(MessageMetadata::commit_update(self.clock.next(), user.clone())),
        };

        self.platform.update_message(update).await?;
        Ok(())
    }
}

/// The commits block and its current text, if the message has one.
pub(crate) fn roster_block(message: &SlackMessage) -> Option<(usize, &str)> {
    let index = message.commits_block_index()?;
    let text = message.blocks[index].text.as_ref()?;
    Some((index, text.text.as_str()))
}
