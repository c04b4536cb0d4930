pub mod alerting;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod notifier;
pub mod services;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::alerting::AlertPolicy;
use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::dashboard::DashboardClient;
use crate::notifier::AlertHistory;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub client: DashboardClient,
    pub policy: Arc<AlertPolicy>,
    pub history: Arc<AlertHistory>,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub pause_flag: Arc<AtomicBool>,
}
