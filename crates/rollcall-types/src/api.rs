use serde::{Deserialize, Serialize};

use crate::ids::ChannelId;
use crate::models::Workout;

// -- Slack --

/// Form body Slack posts to the interactivity endpoint.
#[derive(Debug, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

// -- Schedule --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostScheduleRequest {
    /// Overrides the configured schedule channel.
    #[serde(default)]
    pub channel: Option<ChannelId>,
    pub workouts: Vec<Workout>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostScheduleResponse {
    pub posted: usize,
}
