use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use serde_json::{json, Value};

use arbwatch::alerting::AlertPolicy;
use arbwatch::api::ws_types::WsMessage;
use arbwatch::config::{AppConfig, LogFormat};
use arbwatch::dashboard::DashboardClient;
use arbwatch::notifier::AlertHistory;
use arbwatch::AppState;

/// Nothing listens here, so requests fail fast with "connection refused".
#[allow(dead_code)]
pub const UNREACHABLE_DASHBOARD: &str = "http://127.0.0.1:9";

#[allow(dead_code)]
pub fn test_config(dashboard_url: &str, api_token: Option<&str>) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        api_token: api_token.map(str::to_string),
        dashboard_api_url: dashboard_url.into(),
        poll_interval_secs: 5,
        http_timeout_secs: 5,
        alert_on_startup: false,
        notifications_enabled: false,
        telegram_bot_token: None,
        telegram_chat_id: None,
        desktop_notify_command: None,
        alert_history_size: 10,
        log_format: LogFormat::Text,
    }
}

/// App state whose alert policy records into the state's history.
#[allow(dead_code)]
pub fn build_test_state(dashboard_url: &str, api_token: Option<&str>) -> AppState {
    let config = test_config(dashboard_url, api_token);
    let (ws_tx, _) = tokio::sync::broadcast::channel::<WsMessage>(16);
    let history = Arc::new(AlertHistory::new(config.alert_history_size));
    let policy = Arc::new(AlertPolicy::new(history.clone()));

    AppState {
        client: DashboardClient::new(reqwest::Client::new(), dashboard_url),
        config,
        policy,
        history,
        ws_tx,
        metrics_handle: arbwatch::metrics::detached_handle(),
        pause_flag: Arc::new(AtomicBool::new(false)),
    }
}

#[allow(dead_code)]
pub fn opportunity_json(id: i64, profit: f64, status: &str) -> Value {
    json!({
        "id": id,
        "token_pair": "ETH/USDT",
        "buy_exchange": "binance",
        "sell_exchange": "kraken",
        "buy_price": 3000.0,
        "sell_price": 3075.0,
        "price_difference_percentage": 2.5,
        "estimated_profit_percentage": profit,
        "execution_status": status,
        "timestamp": "2024-05-01T12:00:00"
    })
}

#[allow(dead_code)]
pub async fn body_json(resp: Response<Body>) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Body is not JSON")
}
