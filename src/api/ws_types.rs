use serde::Serialize;

use crate::models::Opportunity;

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "opportunity_alert")]
    OpportunityAlert(Opportunity),

    #[serde(rename = "alerting_status")]
    AlertingStatus(AlertingStatusData),
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertingStatusData {
    pub paused: bool,
}
