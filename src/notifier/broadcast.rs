use tokio::sync::broadcast;

use super::Notifier;
use crate::api::ws_types::WsMessage;
use crate::models::Opportunity;

/// Pushes alerts to connected dashboard WebSocket clients.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<WsMessage>,
}

impl BroadcastNotifier {
    pub fn new(tx: broadcast::Sender<WsMessage>) -> Self {
        Self { tx }
    }
}

impl Notifier for BroadcastNotifier {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn notify(&self, opportunity: &Opportunity) {
        if let Err(e) = self.tx.send(WsMessage::OpportunityAlert(opportunity.clone())) {
            tracing::debug!(error = %e, "No WebSocket subscribers for alert");
        }
    }

    fn is_available(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}
