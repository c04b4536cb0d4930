use serde_json::json;
use tokio::runtime::Handle;

use super::{format_alert_markdown, Notifier};
use crate::models::Opportunity;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram notification service. Failures are logged but never block the main flow.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(http: reqwest::Client, bot_token: String, chat_id: String) -> Self {
        Self {
            http,
            api_base: TELEGRAM_API_BASE.into(),
            bot_token,
            chat_id,
        }
    }

    /// Point the notifier at a different Bot API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Send a Telegram message. Failures are logged as warnings.
    pub async fn send(&self, message: &str) {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    tracing::warn!(
                        status = %resp.status(),
                        "Telegram sendMessage returned non-2xx"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send Telegram notification");
            }
        }
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn notify(&self, opportunity: &Opportunity) {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("No async runtime — Telegram alert dropped");
            return;
        };

        let this = self.clone();
        let message = format_alert_markdown(opportunity);
        handle.spawn(async move {
            this.send(&message).await;
        });
    }

    fn is_available(&self) -> bool {
        Handle::try_current().is_ok()
    }
}
