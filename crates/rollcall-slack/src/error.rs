use rollcall_roster::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("invalid bot token header")]
    InvalidToken,

    #[error("{method}: http error: {source}")]
    Http {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    /// Slack answered `ok: false`.
    #[error("{method}: slack error: {error}")]
    Api { method: String, error: String },

    #[error("{method}: unexpected response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<SlackError> for PlatformError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::Api { method, error } => PlatformError::Api { method, error },
            SlackError::Http { ref method, .. } | SlackError::Decode { ref method, .. } => {
                PlatformError::transport(method, err.to_string())
            }
            SlackError::InvalidToken => PlatformError::transport("auth", err.to_string()),
        }
    }
}
