use tracing::{info, warn};

use rollcall_types::interaction::UncommitInteraction;
use rollcall_types::slack::SlackMessage;

use crate::error::RosterError;
use crate::notices;
use crate::platform::ChatPlatform;
use crate::roster::Roster;
use crate::service::{RosterService, roster_block};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UncommitOutcome {
    /// The payload didn't say which Event Message to edit.
    Unresolvable,
    /// The Event Message has no commits block.
    MissingRosterBlock,
    /// User wasn't on the roster; message untouched.
    NotCommitted,
    /// Roster rewritten without the user.
    Uncommitted { roster: Roster },
}

impl<P: ChatPlatform> RosterService<P> {
    /// The button lives on a private confirmation, not on the Event Message,
    /// so the target comes from the action payload and the content is always
    /// re-read.
    pub async fn handle_uncommit(
        &self,
        interaction: UncommitInteraction,
    ) -> Result<UncommitOutcome, RosterError> {
        let UncommitInteraction {
            user,
            target,
            reply_channel,
            message,
        } = interaction;

        let Some(target) = target else {
            warn!("uncommit by {} has no resolvable event message", user);
            if let Some(channel) = reply_channel {
                self.platform
                    .post_ephemeral(notices::text(&channel, &user, notices::UNRESOLVABLE))
                    .await?;
            }
            return Ok(UncommitOutcome::Unresolvable);
        };

        // The context copy is only a valid fallback if it is the Event Message.
        let fallback = message.filter(|m: &SlackMessage| {
            m.ts.as_ref().is_none_or(|ts| *ts == target.ts)
        });

        let roster = {
            let guard = self.locks.acquire(&target).await;

            let current = self.resolve_message(&target, fallback).await?;
            let Some((block_index, text)) = roster_block(&current) else {
                warn!("{} has no commits block", target);
                drop(guard);
                self.platform
                    .post_ephemeral(notices::text(&target.channel, &user, notices::MISSING_ROSTER))
                    .await?;
                return Ok(UncommitOutcome::MissingRosterBlock);
            };

            let mut roster = Roster::decode(text);
            if !roster.remove(&user) {
                drop(guard);
                self.platform
                    .post_ephemeral(notices::text(&target.channel, &user, notices::NOT_COMMITTED))
                    .await?;
                return Ok(UncommitOutcome::NotCommitted);
            }

            let stripped = roster.retain_allowed(&self.deny_list);
            if stripped > 0 {
                info!("stripped {} deny-listed user(s) from {}", stripped, target);
            }

            self.persist(&target, current, block_index, &roster, &user)
                .await?;
            roster
        };

        info!("{} uncommitted from {} ({} left)", user, target, roster.len());

        self.platform
            .post_ephemeral(notices::text(&target.channel, &user, notices::UNCOMMITTED))
            .await?;

        Ok(UncommitOutcome::Uncommitted { roster })
    }
}
