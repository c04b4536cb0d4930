use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;

use super::Notifier;
use crate::models::{AlertRecord, Opportunity};

/// Bounded in-memory log of delivered alerts, newest last.
#[derive(Debug)]
pub struct AlertHistory {
    capacity: usize,
    records: Mutex<VecDeque<AlertRecord>>,
}

impl AlertHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, opportunity: &Opportunity) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(AlertRecord {
            opportunity: opportunity.clone(),
            detected_at: opportunity.detected_at(),
            alerted_at: Utc::now(),
        });
    }

    /// Most recent alerts first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for AlertHistory {
    fn name(&self) -> &'static str {
        "history"
    }

    fn notify(&self, opportunity: &Opportunity) {
        self.record(opportunity);
    }
}
