use std::sync::Arc;

use tracing::{error, info};

use rollcall_roster::{ChatPlatform, PlatformError};
use rollcall_types::ids::{ChannelId, MessageTs, UserId};
use rollcall_types::models::{CalendarLinks, Workout};
use rollcall_types::slack::NewMessage;

use crate::card;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("posting schedule failed: {0}")]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostedMessage {
    Header { ts: MessageTs },
    Workout { ts: MessageTs, ao: String, start: String },
    Footer { ts: MessageTs },
}

pub struct SchedulePoster<P> {
    platform: Arc<P>,
    links: CalendarLinks,
    /// Gets a DM when posting fails.
    admin: Option<UserId>,
}

impl<P: ChatPlatform> SchedulePoster<P> {
    pub fn new(platform: Arc<P>, links: CalendarLinks, admin: Option<UserId>) -> Self {
        Self {
            platform,
            links,
            admin,
        }
    }

    /// Posts header, workouts ordered by start time then AO, and footer. An
    /// empty schedule posts nothing.
    pub async fn post(
        &self,
        channel: &ChannelId,
        mut workouts: Vec<Workout>,
    ) -> Result<Vec<PostedMessage>, ScheduleError> {
        if workouts.is_empty() {
            info!("No workouts scheduled, posting nothing to {}", channel);
            return Ok(Vec::new());
        }

        workouts.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.ao.cmp(&b.ao)));
        info!("Posting {} workouts to {}", workouts.len(), channel);

        match self.post_all(channel, &workouts).await {
            Ok(posted) => {
                info!("Posted {} messages to {}", posted.len(), channel);
                Ok(posted)
            }
            Err(e) => {
                error!("Schedule post to {} failed: {}", channel, e);
                self.notify_admin(&e).await;
                Err(e.into())
            }
        }
    }

    async fn post_all(
        &self,
        channel: &ChannelId,
        workouts: &[Workout],
    ) -> Result<Vec<PostedMessage>, PlatformError> {
        let mut posted = Vec::with_capacity(workouts.len() + 2);

        let ts = self
            .platform
            .post_message(NewMessage::new(
                channel.clone(),
                "Tomorrow's Schedule",
                card::header_blocks(),
            ))
            .await?;
        posted.push(PostedMessage::Header { ts });

        for workout in workouts {
            let ts = self
                .platform
                .post_message(NewMessage::new(
                    channel.clone(),
                    card::workout_text(workout),
                    card::workout_card(workout),
                ))
                .await?;
            posted.push(PostedMessage::Workout {
                ts,
                ao: workout.ao.clone(),
                start: workout.start.clone(),
            });
        }

        if let Some(blocks) = card::footer_blocks(&self.links) {
            let ts = self
                .platform
                .post_message(NewMessage::new(
                    channel.clone(),
                    "Subscribe to the calendar",
                    blocks,
                ))
                .await?;
            posted.push(PostedMessage::Footer { ts });
        }

        Ok(posted)
    }

    async fn notify_admin(&self, failure: &PlatformError) {
        let Some(admin) = &self.admin else {
            return;
        };

        let text = format!(
            "❌ *Schedule Post Failed*\n\n*Error:* {}\n*Time:* {}\n\nCheck server logs for details.",
            failure,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );

        // A DM is a post to the user's id.
        let dm = NewMessage::new(ChannelId::new(admin.as_str()), text, Vec::new());
        if let Err(e) = self.platform.post_message(dm).await {
            error!("Failed to DM admin {}: {}", admin, e);
        }
    }
}
