use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::ApiStatus;
use crate::models::{AlertSettings, Opportunity, OpportunityId, SettingsUpdate};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dashboard returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("dashboard rejected request: {0}")]
    Rejected(String),
}

/// Client for the arbitrage dashboard's JSON API.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Build a client with its own connection pool and request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the user's alert settings.
    pub async fn get_settings(&self) -> Result<AlertSettings, ClientError> {
        self.get_json("/api/settings").await
    }

    /// Fetch the latest opportunities, newest first.
    ///
    /// Entries that fail to decode are skipped so one bad row does not hide
    /// the rest of the batch.
    pub async fn get_opportunities(&self) -> Result<Vec<Opportunity>, ClientError> {
        let raw: Vec<serde_json::Value> = self.get_json("/api/opportunities").await?;
        Ok(decode_opportunities(raw))
    }

    /// Submit the settings form.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<ApiStatus, ClientError> {
        let url = format!("{}/api/settings", self.base_url);
        let resp = self.http.post(&url).json(update).send().await?;
        into_api_status(resp).await
    }

    /// Ask the dashboard to execute the trade behind an opportunity.
    pub async fn execute_trade(&self, id: &OpportunityId) -> Result<ApiStatus, ClientError> {
        let url = format!("{}/api/execute_trade/{}", self.base_url, id);
        let resp = self.http.get(&url).send().await?;
        into_api_status(resp).await
    }

    pub async fn start_scanner(&self) -> Result<ApiStatus, ClientError> {
        let url = format!("{}/api/scanner/start", self.base_url);
        let resp = self.http.get(&url).send().await?;
        into_api_status(resp).await
    }

    pub async fn stop_scanner(&self) -> Result<ApiStatus, ClientError> {
        let url = format!("{}/api/scanner/stop", self.base_url);
        let resp = self.http.get(&url).send().await?;
        into_api_status(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Unexpected(e.to_string()))
    }
}

/// Action endpoints answer with a `{status, message}` body on both success
/// and failure, so the body is inspected before the HTTP status.
async fn into_api_status(resp: reqwest::Response) -> Result<ApiStatus, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;

    match serde_json::from_str::<ApiStatus>(&body) {
        Ok(api) if api.is_success() && status.is_success() => Ok(api),
        Ok(api) => Err(ClientError::Rejected(
            api.message.unwrap_or_else(|| format!("status {}", api.status)),
        )),
        Err(_) if !status.is_success() => Err(ClientError::Status { status, body }),
        Err(e) => Err(ClientError::Unexpected(e.to_string())),
    }
}

fn decode_opportunities(raw: Vec<serde_json::Value>) -> Vec<Opportunity> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Opportunity>(value) {
            Ok(opp) => Some(opp),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed opportunity");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = DashboardClient::new(Client::new(), "http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let raw = vec![
            json!({
                "id": 1,
                "token_pair": "ETH/USDT",
                "buy_exchange": "binance",
                "sell_exchange": "kraken",
                "buy_price": 3000,
                "sell_price": 3030,
                "estimated_profit_percentage": 1.0,
                "execution_status": "pending"
            }),
            json!({ "id": 2, "token_pair": "BTC/USDT" }),
            json!("garbage"),
        ];

        let opps = decode_opportunities(raw);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].id, OpportunityId::Int(1));
    }
}
