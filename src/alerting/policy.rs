use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use metrics::counter;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{AlertSettings, Opportunity};
use crate::notifier::Notifier;

/// Global minimum spacing between two alerts, across all opportunities.
pub const MIN_ALERT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Why an opportunity did not produce an alert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertRejection {
    #[error("no opportunity supplied")]
    MissingOpportunity,

    #[error("alert settings unavailable")]
    SettingsUnavailable,

    #[error("alert settings incomplete")]
    IncompleteSettings,

    #[error("opportunity has no estimated profit")]
    MissingProfit,

    #[error("alerts disabled in settings")]
    AlertsDisabled,

    #[error("profit {profit}% below threshold {threshold}%")]
    BelowThreshold { profit: Decimal, threshold: Decimal },

    #[error("cooling down for another {remaining:?}")]
    CoolingDown { remaining: Duration },

    #[error("opportunity is {status}, not pending")]
    NotPending { status: String },
}

impl AlertRejection {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AlertRejection::MissingOpportunity => "missing_opportunity",
            AlertRejection::SettingsUnavailable => "settings_unavailable",
            AlertRejection::IncompleteSettings => "incomplete_settings",
            AlertRejection::MissingProfit => "missing_profit",
            AlertRejection::AlertsDisabled => "alerts_disabled",
            AlertRejection::BelowThreshold { .. } => "below_threshold",
            AlertRejection::CoolingDown { .. } => "cooling_down",
            AlertRejection::NotPending { .. } => "not_pending",
        }
    }
}

/// Decides which opportunities are worth a notification.
///
/// Holds the time of the last emitted alert for the lifetime of the session.
/// `evaluate` performs the check and the timestamp update under one lock, so
/// concurrent callers still see at most one alert per [`MIN_ALERT_INTERVAL`].
pub struct AlertPolicy {
    last_alert: Mutex<Option<Instant>>,
    notifier: Arc<dyn Notifier>,
}

impl AlertPolicy {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            last_alert: Mutex::new(None),
            notifier,
        }
    }

    /// Evaluate one newly observed opportunity. On acceptance the cooldown is
    /// charged first, then the notifier is invoked.
    pub fn evaluate(
        &self,
        opportunity: Option<&Opportunity>,
        settings: Option<&AlertSettings>,
        now: Instant,
    ) -> bool {
        let decision = {
            let mut last_alert = self.last_alert.lock().unwrap_or_else(|e| e.into_inner());
            let decision = check_alert(opportunity, settings, *last_alert, now);
            if decision.is_ok() {
                *last_alert = Some(now);
            }
            decision
        };

        match decision {
            Ok(opp) => {
                counter!("alerts_sent_total").increment(1);
                tracing::info!(
                    id = %opp.id,
                    pair = %opp.token_pair,
                    profit_pct = ?opp.estimated_profit_percentage,
                    "Opportunity alert accepted"
                );
                self.notifier.notify(opp);
                true
            }
            Err(rejection) => {
                counter!("alerts_suppressed_total", "reason" => rejection.reason()).increment(1);
                tracing::debug!(
                    id = ?opportunity.map(|o| &o.id),
                    reason = rejection.reason(),
                    "Opportunity alert suppressed: {rejection}"
                );
                false
            }
        }
    }

    /// Run the decision without touching state or notifying anyone.
    pub fn check(
        &self,
        opportunity: Option<&Opportunity>,
        settings: Option<&AlertSettings>,
        now: Instant,
    ) -> Result<(), AlertRejection> {
        check_alert(opportunity, settings, self.last_alert_at(), now).map(|_| ())
    }

    pub fn last_alert_at(&self) -> Option<Instant> {
        *self.last_alert.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Time left before another alert may fire; zero when none is pending.
    pub fn cooldown_remaining(&self, now: Instant) -> Duration {
        match self.last_alert_at() {
            Some(last) => MIN_ALERT_INTERVAL.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

/// The alerting rules, in order. The first failing rule names the rejection.
fn check_alert<'a>(
    opportunity: Option<&'a Opportunity>,
    settings: Option<&AlertSettings>,
    last_alert: Option<Instant>,
    now: Instant,
) -> Result<&'a Opportunity, AlertRejection> {
    let opp = opportunity.ok_or(AlertRejection::MissingOpportunity)?;
    let settings = settings.ok_or(AlertRejection::SettingsUnavailable)?;
    let (Some(enabled), Some(threshold)) =
        (settings.alert_on_opportunities, settings.min_profit_threshold)
    else {
        return Err(AlertRejection::IncompleteSettings);
    };
    let profit = opp
        .estimated_profit_percentage
        .ok_or(AlertRejection::MissingProfit)?;

    // 1. Master switch
    if !enabled {
        return Err(AlertRejection::AlertsDisabled);
    }

    // 2. Profit threshold (equal passes)
    if profit < threshold {
        return Err(AlertRejection::BelowThreshold { profit, threshold });
    }

    // 3. Global cooldown
    if let Some(last) = last_alert {
        let elapsed = now.saturating_duration_since(last);
        if elapsed < MIN_ALERT_INTERVAL {
            return Err(AlertRejection::CoolingDown {
                remaining: MIN_ALERT_INTERVAL - elapsed,
            });
        }
    }

    // 4. Only pending opportunities
    if !opp.is_pending() {
        let status = opp
            .execution_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unset".into());
        return Err(AlertRejection::NotPending { status });
    }

    Ok(opp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
