pub mod opportunity;
pub mod settings;

pub use opportunity::{ExecutionStatus, Opportunity, OpportunityId};
pub use settings::{AlertSettings, SettingsUpdate};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// AlertRecord — an opportunity that made it through the alerting policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub opportunity: Opportunity,
    /// When the dashboard detected it, if the timestamp parsed.
    pub detected_at: Option<DateTime<Utc>>,
    pub alerted_at: DateTime<Utc>,
}
