use std::env;
use std::str::FromStr;

use anyhow::Context;

const DEFAULT_DASHBOARD_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for the control API. Empty / unset disables auth.
    pub api_token: Option<String>,

    // Dashboard server
    pub dashboard_api_url: String,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub alert_on_startup: bool,

    // Notifications
    pub notifications_enabled: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub desktop_notify_command: Option<String>,
    pub alert_history_size: usize,

    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(get("PORT"), "PORT", 8081)?,
            api_token: get("API_TOKEN"),

            dashboard_api_url: get("DASHBOARD_API_URL").unwrap_or_else(|| DEFAULT_DASHBOARD_URL.into()),
            poll_interval_secs: parse_or(get("POLL_INTERVAL_SECS"), "POLL_INTERVAL_SECS", 5)?,
            http_timeout_secs: parse_or(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 10)?,
            alert_on_startup: parse_or(get("ALERT_ON_STARTUP"), "ALERT_ON_STARTUP", false)?,

            notifications_enabled: parse_or(get("NOTIFICATIONS_ENABLED"), "NOTIFICATIONS_ENABLED", true)?,
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            desktop_notify_command: get("DESKTOP_NOTIFY_COMMAND"),
            alert_history_size: parse_or(get("ALERT_HISTORY_SIZE"), "ALERT_HISTORY_SIZE", 50)?,

            log_format,
        })
    }

    /// Bot token and chat id, only when both are configured.
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Some((token, chat_id)),
            _ => None,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .parse()
            .with_context(|| format!("{key} has an invalid value: '{v}'")),
        None => Ok(default),
    }
}
