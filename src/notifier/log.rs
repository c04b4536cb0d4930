use super::Notifier;
use crate::models::Opportunity;

/// Writes each alert as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    fn notify(&self, opportunity: &Opportunity) {
        tracing::info!(
            id = %opportunity.id,
            pair = %opportunity.token_pair,
            buy_exchange = %opportunity.buy_exchange,
            sell_exchange = %opportunity.sell_exchange,
            profit_pct = ?opportunity.estimated_profit_percentage,
            spread_pct = ?opportunity.spread_percentage(),
            "ARBITRAGE OPPORTUNITY"
        );
    }
}
