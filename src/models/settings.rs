use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Alert settings as reported by `GET /api/settings`.
///
/// Both fields are optional on the wire. A settings object missing either one
/// is treated as incomplete and never allows an alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default, alias = "alertOnOpportunities")]
    pub alert_on_opportunities: Option<bool>,
    #[serde(default, alias = "minProfitThreshold")]
    pub min_profit_threshold: Option<Decimal>,
}

impl AlertSettings {
    pub fn new(alert_on_opportunities: bool, min_profit_threshold: Decimal) -> Self {
        Self {
            alert_on_opportunities: Some(alert_on_opportunities),
            min_profit_threshold: Some(min_profit_threshold),
        }
    }
}

/// Payload of the settings form, submitted with `POST /api/settings`.
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_profit_threshold: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_on_opportunities: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_flashloans: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.scan_interval.is_none()
            && self.min_profit_threshold.is_none()
            && self.gas_price_limit.is_none()
            && self.alert_on_opportunities.is_none()
            && self.use_flashloans.is_none()
    }
}
