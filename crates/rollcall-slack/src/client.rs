use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use rollcall_roster::{ChatPlatform, PlatformError};
use rollcall_types::ids::{ChannelId, MessageTs};
use rollcall_types::slack::{EphemeralNotice, MessageUpdate, NewMessage, SlackMessage};

use crate::error::SlackError;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Slack Web API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ts: MessageTs,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<SlackMessage>,
}

impl SlackClient {
    pub fn new(
        bot_token: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SlackError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {bot_token}"))
            .map_err(|_| SlackError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|source| SlackError::Http {
                method: "client".into(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// POSTs a JSON body to a write method.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, SlackError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|source| SlackError::Http {
                method: method.into(),
                source,
            })?;
        parse(method, response).await
    }

    /// GETs a read method with query parameters. Slack doesn't accept JSON
    /// bodies on read methods.
    async fn query<T>(&self, method: &str, params: &[(&str, &str)]) -> Result<T, SlackError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(self.url(method))
            .query(params)
            .send()
            .await
            .map_err(|source| SlackError::Http {
                method: method.into(),
                source,
            })?;
        parse(method, response).await
    }

    pub async fn post_message(&self, message: &NewMessage) -> Result<MessageTs, SlackError> {
        let response: PostMessageResponse = self.call("chat.postMessage", message).await?;
        debug!("posted message {} to {}", response.ts, message.channel);
        Ok(response.ts)
    }

    pub async fn update_message(&self, update: &MessageUpdate) -> Result<(), SlackError> {
        let _: IgnoredAny = self.call("chat.update", update).await?;
        Ok(())
    }

    pub async fn post_ephemeral(&self, notice: &EphemeralNotice) -> Result<(), SlackError> {
        let _: IgnoredAny = self.call("chat.postEphemeral", notice).await?;
        Ok(())
    }

    /// Reads one message via `conversations.history`. Returns `None` if Slack
    /// doesn't hand back the exact message, e.g. because it is a thread reply.
    pub async fn fetch_message(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> Result<Option<SlackMessage>, SlackError> {
        let response: HistoryResponse = self
            .query(
                "conversations.history",
                &[
                    ("channel", channel.as_str()),
                    ("latest", ts.as_str()),
                    ("inclusive", "true"),
                    ("limit", "1"),
                ],
            )
            .await?;

        Ok(response
            .messages
            .into_iter()
            .find(|m| m.ts.as_ref() == Some(ts)))
    }
}

async fn parse<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T, SlackError> {
    let status = response.status();
    let body: Value = response.json().await.map_err(|source| SlackError::Http {
        method: method.into(),
        source,
    })?;
    decode_envelope(method, status.as_u16(), body)
}

/// Every Web API answer is `{ "ok": bool, "error"?: string, ... }`.
fn decode_envelope<T: DeserializeOwned>(method: &str, status: u16, body: Value) -> Result<T, SlackError> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("http_{status}"));
        warn!("{} returned error: {}", method, error);
        return Err(SlackError::Api {
            method: method.into(),
            error,
        });
    }

    serde_json::from_value(body).map_err(|source| SlackError::Decode {
        method: method.into(),
        source,
    })
}

impl ChatPlatform for SlackClient {
    async fn post_message(&self, message: NewMessage) -> Result<MessageTs, PlatformError> {
        Ok(SlackClient::post_message(self, &message).await?)
    }

    async fn update_message(&self, update: MessageUpdate) -> Result<(), PlatformError> {
        Ok(SlackClient::update_message(self, &update).await?)
    }

    async fn post_ephemeral(&self, notice: EphemeralNotice) -> Result<(), PlatformError> {
        Ok(SlackClient::post_ephemeral(self, &notice).await?)
    }

    async fn fetch_message(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> Result<Option<SlackMessage>, PlatformError> {
        Ok(SlackClient::fetch_message(self, channel, ts).await?)
    }
}
