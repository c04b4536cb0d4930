pub mod broadcast;
pub mod desktop;
pub mod history;
pub mod log;
pub mod telegram;

pub use broadcast::BroadcastNotifier;
pub use desktop::DesktopNotifier;
pub use history::AlertHistory;
pub use log::LogNotifier;
pub use telegram::TelegramNotifier;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::models::Opportunity;

pub const ALERT_TITLE: &str = "Arbitrage Opportunity";

/// Sink for opportunity alerts.
///
/// `notify` is fire-and-forget: delivery problems are handled (and logged)
/// inside the sink and never reported back to the caller.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn notify(&self, opportunity: &Opportunity);

    /// Whether the sink can deliver right now.
    fn is_available(&self) -> bool {
        true
    }
}

/// Fans an alert out to every available sink.
#[derive(Clone, Default)]
pub struct NotifierSet {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn Notifier>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl Notifier for NotifierSet {
    fn name(&self) -> &'static str {
        "fanout"
    }

    fn notify(&self, opportunity: &Opportunity) {
        for sink in &self.sinks {
            if !sink.is_available() {
                tracing::debug!(sink = sink.name(), "Notifier unavailable — skipping");
                continue;
            }
            sink.notify(opportunity);
        }
    }

    fn is_available(&self) -> bool {
        self.sinks.iter().any(|s| s.is_available())
    }
}

/// Body line shared by every sink.
pub fn format_alert_body(opportunity: &Opportunity) -> String {
    let profit = opportunity
        .estimated_profit_percentage
        .map(|p| format!("{:.2}%", p.round_dp(2)))
        .unwrap_or_else(|| "n/a".into());

    format!(
        "{}: Buy on {}, Sell on {}, Profit: {}",
        opportunity.token_pair, opportunity.buy_exchange, opportunity.sell_exchange, profit,
    )
}

/// Markdown variant used by chat sinks.
pub fn format_alert_markdown(opportunity: &Opportunity) -> String {
    let profit = opportunity
        .estimated_profit_percentage
        .unwrap_or(Decimal::ZERO)
        .round_dp(2);

    format!(
        "*{}*\nPair: `{}`\nBuy: {} @ {}\nSell: {} @ {}\nProfit: {:.2}%",
        ALERT_TITLE,
        opportunity.token_pair,
        opportunity.buy_exchange,
        opportunity.buy_price,
        opportunity.sell_exchange,
        opportunity.sell_price,
        profit,
    )
}
