use tracing::{debug, info, warn};

use rollcall_types::interaction::CommitInteraction;

use crate::error::RosterError;
use crate::notices;
use crate::platform::ChatPlatform;
use crate::roster::Roster;
use crate::service::{RosterService, roster_block};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// User is on the deny-list; message untouched.
    Denied,
    /// User was already on the roster; message untouched.
    AlreadyCommitted,
    /// The Event Message has no commits block.
    MissingRosterBlock,
    /// Roster rewritten with the user appended.
    Committed { roster: Roster },
}

impl<P: ChatPlatform> RosterService<P> {
    pub async fn handle_commit(
        &self,
        interaction: CommitInteraction,
    ) -> Result<CommitOutcome, RosterError> {
        let CommitInteraction {
            user,
            target,
            message,
        } = interaction;

        if self.deny_list.contains(&user) {
            debug!("{} is deny-listed, rejecting commit on {}", user, target);
            self.platform
                .post_ephemeral(notices::text(&target.channel, &user, notices::DENIED))
                .await?;
            return Ok(CommitOutcome::Denied);
        }

        let roster = {
            let guard = self.locks.acquire(&target).await;

            let current = self.resolve_message(&target, message).await?;
            let Some((block_index, text)) = roster_block(&current) else {
                warn!("{} has no commits block", target);
                drop(guard);
                self.platform
                    .post_ephemeral(notices::text(&target.channel, &user, notices::MISSING_ROSTER))
                    .await?;
                return Ok(CommitOutcome::MissingRosterBlock);
            };

            let mut roster = Roster::decode(text);
            if roster.contains(&user) {
                drop(guard);
                self.platform
                    .post_ephemeral(notices::with_uncommit(
                        &target,
                        &user,
                        notices::ALREADY_COMMITTED,
                    ))
                    .await?;
                return Ok(CommitOutcome::AlreadyCommitted);
            }

            let stripped = roster.retain_allowed(&self.deny_list);
            if stripped > 0 {
                info!("stripped {} deny-listed user(s) from {}", stripped, target);
            }
            roster.insert(user.clone());

            self.persist(&target, current, block_index, &roster, &user)
                .await?;
            roster
        };

        info!("{} committed to {} ({} total)", user, target, roster.len());

        self.platform
            .post_ephemeral(notices::with_uncommit(&target, &user, notices::COMMITTED))
            .await?;

        Ok(CommitOutcome::Committed { roster })
    }
}
