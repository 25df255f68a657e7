use std::time::Duration;

use anyhow::Context;

use rollcall_roster::DenyList;
use rollcall_slack::client::DEFAULT_API_BASE;
use rollcall_types::ids::{ChannelId, UserId};
use rollcall_types::models::CalendarLinks;

/// Process configuration, read once from the environment at startup.
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a token the bot runs against an in-memory platform.
    pub slack_bot_token: Option<String>,
    /// Without a secret inbound requests are not verified.
    pub slack_signing_secret: Option<String>,
    pub slack_api_base: String,
    pub http_timeout: Duration,
    pub deny_list: DenyList,
    /// Default channel for the daily schedule.
    pub schedule_channel: Option<ChannelId>,
    /// Receives a DM when posting the schedule fails.
    pub admin_user: Option<UserId>,
    pub calendar: CalendarLinks,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Unset and empty are treated alike.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = var("ROLLCALL_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ROLLCALL_PORT must be a port number")?;
        let timeout_secs: u64 = var("ROLLCALL_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("ROLLCALL_HTTP_TIMEOUT_SECS must be a number of seconds")?;

        Ok(Self {
            host: var("ROLLCALL_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            slack_bot_token: var("SLACK_BOT_TOKEN"),
            slack_signing_secret: var("SLACK_SIGNING_SECRET"),
            slack_api_base: var("SLACK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            http_timeout: Duration::from_secs(timeout_secs),
            deny_list: var("ROLLCALL_DENY_LIST")
                .map(|raw| DenyList::from_csv(&raw))
                .unwrap_or_default(),
            schedule_channel: var("ROLLCALL_CHANNEL").map(ChannelId::new),
            admin_user: var("ROLLCALL_ADMIN_USER").map(UserId::new),
            calendar: CalendarLinks {
                google: var("ROLLCALL_CALENDAR_GOOGLE"),
                ical: var("ROLLCALL_CALENDAR_ICAL"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.slack_bot_token.is_none());
        assert_eq!(config.slack_api_base, DEFAULT_API_BASE);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.deny_list.is_empty());
        assert!(config.calendar.is_empty());
    }

    #[test]
    fn reads_deny_list_and_links() {
        let config = config(&[
            ("ROLLCALL_DENY_LIST", "U1, U2"),
            ("ROLLCALL_CALENDAR_ICAL", "https://cal/ics"),
            ("ROLLCALL_CHANNEL", "C42"),
            ("SLACK_BOT_TOKEN", ""),
        ])
        .unwrap();
        assert_eq!(config.deny_list.len(), 2);
        assert!(config.deny_list.contains(&UserId::new("U2")));
        assert_eq!(config.calendar.ical.as_deref(), Some("https://cal/ics"));
        assert_eq!(config.schedule_channel, Some(ChannelId::new("C42")));
        assert!(config.slack_bot_token.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(config(&[("ROLLCALL_PORT", "eighty")]).is_err());
    }
}
