use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use tracing::{Instrument, debug, error, info_span, warn};

use rollcall_roster::{ChatPlatform, RosterService};
use rollcall_schedule::{ScheduleError, SchedulePoster};
use rollcall_slack::signature::{self, SIGNATURE_HEADER, SignatureError, TIMESTAMP_HEADER};
use rollcall_types::api::{InteractionForm, PostScheduleRequest, PostScheduleResponse};
use rollcall_types::ids::ChannelId;
use rollcall_types::interaction::{Interaction, RawInteraction};

pub struct AppState<P> {
    pub roster: Arc<RosterService<P>>,
    pub poster: Arc<SchedulePoster<P>>,
    /// `None` skips request verification.
    pub signing_secret: Option<Arc<str>>,
    pub schedule_channel: Option<ChannelId>,
}

// Derive would require `P: Clone`.
impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            roster: self.roster.clone(),
            poster: self.poster.clone(),
            signing_secret: self.signing_secret.clone(),
            schedule_channel: self.schedule_channel.clone(),
        }
    }
}

pub fn router<P: ChatPlatform>(state: AppState<P>) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events::<P>))
        .route("/api/heartbeat", get(heartbeat))
        .route("/api/schedule", post(post_schedule::<P>))
        .with_state(state)
}

async fn heartbeat() -> &'static str {
    "Ok"
}

/// Slack interactivity endpoint. Acknowledges as soon as the payload is
/// validated; the roster edit runs in the background so Slack's three second
/// deadline is never at stake.
async fn slack_events<P: ChatPlatform>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.signing_secret {
        if let Err(e) = verify_request(secret, &headers, &body) {
            warn!("Rejected Slack request: {}", e);
            return StatusCode::UNAUTHORIZED;
        }
    }

    let form: InteractionForm = match serde_urlencoded::from_bytes(&body) {
        Ok(form) => form,
        Err(e) => {
            warn!("Interaction body is not a payload form: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let raw: RawInteraction = match serde_json::from_str(&form.payload) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Interaction payload is not valid JSON: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let interaction = match Interaction::from_raw(raw) {
        Ok(Some(interaction)) => interaction,
        Ok(None) => {
            debug!("Ignoring unrelated interaction");
            return StatusCode::OK;
        }
        Err(e) => {
            warn!("Malformed interaction: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let span = info_span!(
        "interaction",
        id = %uuid::Uuid::new_v4(),
        user = %interaction.user(),
    );
    let roster = state.roster.clone();
    tokio::spawn(async move { roster.dispatch(interaction).await }.instrument(span));

    StatusCode::OK
}

fn verify_request(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(timestamp), Some(sig)) = (header(TIMESTAMP_HEADER), header(SIGNATURE_HEADER)) else {
        return Err(SignatureError::MissingHeaders);
    };
    signature::verify(secret, timestamp, sig, body, chrono::Utc::now().timestamp())
}

async fn post_schedule<P: ChatPlatform>(
    State(state): State<AppState<P>>,
    Json(req): Json<PostScheduleRequest>,
) -> Result<Json<PostScheduleResponse>, StatusCode> {
    let channel = req
        .channel
        .or_else(|| state.schedule_channel.clone())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let posted = state
        .poster
        .post(&channel, req.workouts)
        .await
        .map_err(|e| match e {
            ScheduleError::Platform(e) => {
                error!("Schedule post failed: {}", e);
                StatusCode::BAD_GATEWAY
            }
        })?;

    Ok(Json(PostScheduleResponse {
        posted: posted.len(),
    }))
}
