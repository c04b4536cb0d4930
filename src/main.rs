use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use arbwatch::alerting::AlertPolicy;
use arbwatch::api::router::create_router;
use arbwatch::api::ws_types::WsMessage;
use arbwatch::config::{AppConfig, LogFormat};
use arbwatch::dashboard::DashboardClient;
use arbwatch::notifier::{
    AlertHistory, BroadcastNotifier, DesktopNotifier, LogNotifier, NotifierSet, TelegramNotifier,
};
use arbwatch::services::{run_opportunity_poller, PollerConfig};
use arbwatch::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let metrics_handle = arbwatch::metrics::init_metrics()?;
    let addr = format!("{}:{}", config.host, config.port);

    let client = DashboardClient::with_timeout(
        config.dashboard_api_url.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )?;

    // --- Notification sinks ---
    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);
    let history = Arc::new(AlertHistory::new(config.alert_history_size));

    let mut sinks = NotifierSet::new()
        .with(history.clone())
        .with(Arc::new(LogNotifier))
        .with(Arc::new(BroadcastNotifier::new(ws_tx.clone())));

    if config.notifications_enabled {
        if let Some((token, chat_id)) = config.telegram_credentials() {
            sinks.push(Arc::new(TelegramNotifier::new(
                reqwest::Client::new(),
                token.to_string(),
                chat_id.to_string(),
            )));
        } else {
            tracing::info!("Telegram not configured — skipping Telegram alerts");
        }

        match config.desktop_notify_command.as_deref().and_then(DesktopNotifier::from_command_line) {
            Some(desktop) => {
                tracing::info!(program = %desktop.program(), "Desktop notifications enabled");
                sinks.push(Arc::new(desktop));
            }
            None => tracing::info!("DESKTOP_NOTIFY_COMMAND not set — skipping desktop alerts"),
        }
    } else {
        tracing::info!("External notifications disabled (NOTIFICATIONS_ENABLED=false)");
    }

    tracing::info!(sinks = ?sinks.names(), "Notification sinks ready");

    let policy = Arc::new(AlertPolicy::new(Arc::new(sinks)));
    let pause_flag = Arc::new(AtomicBool::new(false));

    // --- Opportunity poller ---
    {
        let client = client.clone();
        let policy = Arc::clone(&policy);
        let pause_flag = Arc::clone(&pause_flag);
        let poller_config = PollerConfig {
            interval_secs: config.poll_interval_secs,
            alert_on_startup: config.alert_on_startup,
        };
        tokio::spawn(async move {
            run_opportunity_poller(client, policy, pause_flag, poller_config).await;
        });
    }

    let state = AppState {
        config,
        client,
        policy,
        history,
        ws_tx,
        metrics_handle,
        pause_flag,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Control API listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
