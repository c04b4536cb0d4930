use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// OpportunityId
// ---------------------------------------------------------------------------

/// Server-assigned identifier. The dashboard uses integer primary keys, but
/// string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpportunityId {
    Int(i64),
    Str(String),
}

impl fmt::Display for OpportunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityId::Int(n) => write!(f, "{n}"),
            OpportunityId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for OpportunityId {
    fn from(n: i64) -> Self {
        OpportunityId::Int(n)
    }
}

impl From<&str> for OpportunityId {
    fn from(s: &str) -> Self {
        OpportunityId::Str(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// ExecutionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    /// The server reports in-flight trades as `processing`.
    #[serde(alias = "processing")]
    Executing,
    Completed,
    Failed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Executing => "executing",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Expired => "expired",
            ExecutionStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Opportunity — snapshot produced by the dashboard's scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    #[serde(alias = "tokenPair")]
    pub token_pair: String,
    #[serde(alias = "buyExchange")]
    pub buy_exchange: String,
    #[serde(alias = "sellExchange")]
    pub sell_exchange: String,
    #[serde(alias = "buyPrice")]
    pub buy_price: Decimal,
    #[serde(alias = "sellPrice")]
    pub sell_price: Decimal,
    #[serde(default, alias = "priceDifferencePercentage")]
    pub price_difference_percentage: Option<Decimal>,
    /// Trusted as reported; never recomputed from the prices.
    #[serde(default, alias = "estimatedProfitPercentage")]
    pub estimated_profit_percentage: Option<Decimal>,
    #[serde(default, alias = "executionStatus")]
    pub execution_status: Option<ExecutionStatus>,
    /// Detection time as sent by the server, either RFC 3339 or a naive
    /// ISO 8601 string in UTC.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Opportunity {
    pub fn is_pending(&self) -> bool {
        self.execution_status == Some(ExecutionStatus::Pending)
    }

    pub fn detected_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Raw spread between the two venues, for display only.
    pub fn spread_percentage(&self) -> Option<Decimal> {
        if self.buy_price.is_zero() {
            return None;
        }
        Some((self.sell_price - self.buy_price) / self.buy_price * Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Opportunity #{}: {} buy={}@{} sell={}@{}",
            self.id, self.token_pair, self.buy_exchange, self.buy_price, self.sell_exchange, self.sell_price,
        )
    }
}
