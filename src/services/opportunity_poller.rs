use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::alerting::AlertPolicy;
use crate::dashboard::DashboardClient;
use crate::models::{AlertSettings, Opportunity, OpportunityId};

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval_secs: u64,
    /// Evaluate the first batch too, instead of only recording it as seen.
    pub alert_on_startup: bool,
}

/// How many handled ids to remember. Comfortably above the dashboard's feed
/// window, so empty or partial batches never make old rows look new.
pub const SEEN_HISTORY: usize = 1_000;

/// Bounded memory of opportunity ids already handled, oldest evicted first.
#[derive(Debug, Clone)]
pub struct SeenIds {
    capacity: usize,
    order: VecDeque<OpportunityId>,
    ids: HashSet<OpportunityId>,
}

impl SeenIds {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, id: &OpportunityId) -> bool {
        self.ids.contains(id)
    }

    /// Returns false if the id was already known.
    pub fn insert(&mut self, id: OpportunityId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.ids.insert(id.clone());
        self.order.push_back(id);
        true
    }

    /// Remember every id in the batch. Adds to, never replaces, what is known.
    pub fn record(&mut self, batch: &[Opportunity]) {
        for opp in batch {
            self.insert(opp.id.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Opportunities in `batch` that have not been handled before.
pub fn new_opportunities<'a>(batch: &'a [Opportunity], seen: &SeenIds) -> Vec<&'a Opportunity> {
    batch.iter().filter(|o| !seen.contains(&o.id)).collect()
}

/// Run each fresh opportunity through the policy, in feed order.
/// Returns how many alerts fired.
pub fn evaluate_batch(
    policy: &AlertPolicy,
    fresh: &[&Opportunity],
    settings: Option<&AlertSettings>,
    now: Instant,
) -> usize {
    fresh
        .iter()
        .filter(|opp| policy.evaluate(Some(**opp), settings, now))
        .count()
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Paused,
    FetchFailed,
    /// First batch, only recorded as seen.
    Seeded { count: usize },
    Polled { new: usize, alerted: usize },
}

pub struct OpportunityPoller {
    client: DashboardClient,
    policy: Arc<AlertPolicy>,
    pause_flag: Arc<AtomicBool>,
    config: PollerConfig,
    seen: SeenIds,
    seeded: bool,
}

impl OpportunityPoller {
    pub fn new(
        client: DashboardClient,
        policy: Arc<AlertPolicy>,
        pause_flag: Arc<AtomicBool>,
        config: PollerConfig,
    ) -> Self {
        Self {
            client,
            policy,
            pause_flag,
            config,
            seen: SeenIds::new(SEEN_HISTORY),
            seeded: false,
        }
    }

    /// One tick of the poller.
    ///
    /// 1. Skip if alerting is paused
    /// 2. Fetch the latest opportunities
    /// 3. Diff against the ids already handled
    /// 4. Only when something is new, fetch the alert settings
    /// 5. Evaluate each new opportunity through the alert policy
    pub async fn poll_once(&mut self) -> PollOutcome {
        if self.pause_flag.load(Ordering::Relaxed) {
            tracing::debug!("Opportunity poller paused");
            return PollOutcome::Paused;
        }

        let batch = match self.client.get_opportunities().await {
            Ok(b) => b,
            Err(e) => {
                counter!("poll_failures_total", "endpoint" => "opportunities").increment(1);
                tracing::warn!(error = %e, "Opportunity poller: failed to fetch opportunities");
                return PollOutcome::FetchFailed;
            }
        };

        if !self.seeded {
            self.seeded = true;
            tracing::info!(count = batch.len(), "Initial opportunity batch received");
            if !self.config.alert_on_startup {
                self.seen.record(&batch);
                return PollOutcome::Seeded { count: batch.len() };
            }
        }

        let fresh = new_opportunities(&batch, &self.seen);
        let alerted = if fresh.is_empty() {
            0
        } else {
            run_cycle(&self.client, &self.policy, &fresh).await
        };
        let new = fresh.len();

        self.seen.record(&batch);
        PollOutcome::Polled { new, alerted }
    }

    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            dashboard = %self.client.base_url(),
            "Opportunity poller started"
        );

        let mut ticker = interval(Duration::from_secs(self.config.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }
}

/// Poll the dashboard for opportunities and alert on new ones, forever.
pub async fn run_opportunity_poller(
    client: DashboardClient,
    policy: Arc<AlertPolicy>,
    pause_flag: Arc<AtomicBool>,
    config: PollerConfig,
) {
    OpportunityPoller::new(client, policy, pause_flag, config).run().await;
}

async fn run_cycle(client: &DashboardClient, policy: &AlertPolicy, fresh: &[&Opportunity]) -> usize {
    counter!("opportunities_seen_total").increment(fresh.len() as u64);

    let settings = match client.get_settings().await {
        Ok(s) => Some(s),
        Err(e) => {
            counter!("poll_failures_total", "endpoint" => "settings").increment(1);
            tracing::warn!(error = %e, "Could not fetch alert settings — alerts suppressed this cycle");
            None
        }
    };

    let alerted = evaluate_batch(policy, fresh, settings.as_ref(), Instant::now());

    tracing::info!(
        new_opportunities = fresh.len(),
        alerted = alerted,
        "Opportunity poller cycle: {} new, {} alerted",
        fresh.len(),
        alerted
    );
    alerted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use mockito::{Mock, ServerGuard};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::models::ExecutionStatus;
    use crate::notifier::test_support::{opportunity, RecordingNotifier};
    use crate::notifier::AlertHistory;

    fn batch(ids: &[i64]) -> Vec<Opportunity> {
        ids.iter()
            .map(|&id| opportunity(id, Decimal::TWO, ExecutionStatus::Pending))
            .collect()
    }

    fn seen_from(ids: &[i64]) -> SeenIds {
        let mut seen = SeenIds::new(SEEN_HISTORY);
        seen.record(&batch(ids));
        seen
    }

    #[test]
    fn test_new_opportunities_diff() {
        let previous = seen_from(&[3, 2, 1]);
        let current = batch(&[5, 4, 3, 2]);

        let fresh: Vec<OpportunityId> = new_opportunities(&current, &previous)
            .into_iter()
            .map(|o| o.id.clone())
            .collect();
        assert_eq!(fresh, vec![OpportunityId::Int(5), OpportunityId::Int(4)]);
    }

    #[test]
    fn test_seen_ids_survive_empty_and_partial_batches() {
        let mut seen = seen_from(&[2, 1]);
        seen.record(&[]);
        seen.record(&batch(&[1]));

        assert!(new_opportunities(&batch(&[2, 1]), &seen).is_empty());
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_seen_ids_evict_oldest_at_capacity() {
        let mut seen = SeenIds::new(2);
        seen.record(&batch(&[1, 2]));
        assert!(!seen.insert(OpportunityId::Int(2)));
        assert!(seen.insert(OpportunityId::Int(3)));

        assert!(!seen.contains(&OpportunityId::Int(1)));
        assert!(seen.contains(&OpportunityId::Int(2)));
        assert!(seen.contains(&OpportunityId::Int(3)));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_burst_in_one_batch_alerts_once() {
        let recorder = Arc::new(RecordingNotifier::default());
        let policy = AlertPolicy::new(recorder.clone());
        let settings = AlertSettings::new(true, Decimal::ONE);

        let current = batch(&[10, 11, 12, 13]);
        let fresh: Vec<&Opportunity> = current.iter().collect();

        let alerted = evaluate_batch(&policy, &fresh, Some(&settings), Instant::now());
        assert_eq!(alerted, 1);
        assert_eq!(recorder.received.lock().unwrap()[0], OpportunityId::Int(10));
    }

    #[test]
    fn test_missing_settings_suppresses_batch() {
        let recorder = Arc::new(RecordingNotifier::default());
        let policy = AlertPolicy::new(recorder.clone());

        let current = batch(&[1, 2]);
        let fresh: Vec<&Opportunity> = current.iter().collect();

        assert_eq!(evaluate_batch(&policy, &fresh, None, Instant::now()), 0);
        assert_eq!(recorder.count(), 0);
        assert_eq!(policy.last_alert_at(), None);
    }

    #[test]
    fn test_ineligible_first_does_not_block_later_entry() {
        let recorder = Arc::new(RecordingNotifier::default());
        let policy = AlertPolicy::new(recorder.clone());
        let settings = AlertSettings::new(true, Decimal::ONE);

        let current = vec![
            opportunity(1, Decimal::new(5, 1), ExecutionStatus::Pending),
            opportunity(2, Decimal::TWO, ExecutionStatus::Completed),
            opportunity(3, Decimal::TWO, ExecutionStatus::Pending),
        ];
        let fresh: Vec<&Opportunity> = current.iter().collect();

        assert_eq!(evaluate_batch(&policy, &fresh, Some(&settings), Instant::now()), 1);
        assert_eq!(recorder.received.lock().unwrap().clone(), vec![OpportunityId::Int(3)]);
    }

    // --- Poller against a mock dashboard ---

    struct Harness {
        poller: OpportunityPoller,
        history: Arc<AlertHistory>,
        pause_flag: Arc<AtomicBool>,
    }

    fn harness(server: &ServerGuard, alert_on_startup: bool) -> Harness {
        let client = DashboardClient::new(reqwest::Client::new(), server.url());
        let history = Arc::new(AlertHistory::new(10));
        let policy = Arc::new(AlertPolicy::new(history.clone()));
        let pause_flag = Arc::new(AtomicBool::new(false));
        let config = PollerConfig {
            interval_secs: 1,
            alert_on_startup,
        };
        Harness {
            poller: OpportunityPoller::new(client, policy, pause_flag.clone(), config),
            history,
            pause_flag,
        }
    }

    fn feed_json(ids: &[i64]) -> String {
        let rows: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "token_pair": "ETH/USDT",
                    "buy_exchange": "binance",
                    "sell_exchange": "kraken",
                    "buy_price": 3000.0,
                    "sell_price": 3075.0,
                    "price_difference_percentage": 2.5,
                    "estimated_profit_percentage": 2.0,
                    "execution_status": "pending",
                    "timestamp": "2024-05-01T12:00:00"
                })
            })
            .collect();
        serde_json::Value::Array(rows).to_string()
    }

    async fn serve_feed(server: &mut ServerGuard, ids: &[i64], hits: usize) -> Mock {
        server
            .mock("GET", "/api/opportunities")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(feed_json(ids))
            .expect(hits)
            .create_async()
            .await
    }

    async fn serve_settings(server: &mut ServerGuard, hits: usize) -> Mock {
        server
            .mock("GET", "/api/settings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"alert_on_opportunities": true, "min_profit_threshold": 1.0}"#)
            .expect(hits)
            .create_async()
            .await
    }

    fn alerted_ids(history: &AlertHistory) -> Vec<OpportunityId> {
        history
            .recent(10)
            .into_iter()
            .map(|r| r.opportunity.id)
            .collect()
    }

    #[tokio::test]
    async fn test_first_batch_only_seeds() {
        let mut server = mockito::Server::new_async().await;
        let feed = serve_feed(&mut server, &[2, 1], 1).await;
        let settings = serve_settings(&mut server, 0).await;
        let mut h = harness(&server, false);

        assert_eq!(h.poller.poll_once().await, PollOutcome::Seeded { count: 2 });
        assert!(h.history.is_empty());

        feed.assert_async().await;
        settings.assert_async().await;
    }

    #[tokio::test]
    async fn test_alert_on_startup_evaluates_first_batch() {
        let mut server = mockito::Server::new_async().await;
        let feed = serve_feed(&mut server, &[2, 1], 1).await;
        let settings = serve_settings(&mut server, 1).await;
        let mut h = harness(&server, true);

        assert_eq!(
            h.poller.poll_once().await,
            PollOutcome::Polled { new: 2, alerted: 1 }
        );
        assert_eq!(alerted_ids(&h.history), vec![OpportunityId::Int(2)]);

        feed.assert_async().await;
        settings.assert_async().await;
    }

    #[tokio::test]
    async fn test_paused_poller_does_not_fetch() {
        let mut server = mockito::Server::new_async().await;
        let feed = serve_feed(&mut server, &[1], 0).await;
        let mut h = harness(&server, true);
        h.pause_flag.store(true, Ordering::Relaxed);

        assert_eq!(h.poller.poll_once().await, PollOutcome::Paused);
        feed.assert_async().await;
    }

    #[tokio::test]
    async fn test_unchanged_feed_skips_settings_fetch() {
        let mut server = mockito::Server::new_async().await;
        let feed = serve_feed(&mut server, &[1], 2).await;
        let settings = serve_settings(&mut server, 0).await;
        let mut h = harness(&server, false);

        h.poller.poll_once().await;
        assert_eq!(
            h.poller.poll_once().await,
            PollOutcome::Polled { new: 0, alerted: 0 }
        );

        feed.assert_async().await;
        settings.assert_async().await;
    }

    #[tokio::test]
    async fn test_new_opportunity_alerts_once_across_empty_feed() {
        let mut server = mockito::Server::new_async().await;
        let settings = serve_settings(&mut server, 1).await;
        let mut h = harness(&server, false);

        let feed = serve_feed(&mut server, &[1], 1).await;
        h.poller.poll_once().await;
        feed.remove_async().await;

        let feed = serve_feed(&mut server, &[2, 1], 1).await;
        assert_eq!(
            h.poller.poll_once().await,
            PollOutcome::Polled { new: 1, alerted: 1 }
        );
        feed.remove_async().await;

        let feed = serve_feed(&mut server, &[], 1).await;
        h.poller.poll_once().await;
        feed.remove_async().await;

        // The same rows come back after a blank response: nothing is new.
        let feed = serve_feed(&mut server, &[2, 1], 1).await;
        assert_eq!(
            h.poller.poll_once().await,
            PollOutcome::Polled { new: 0, alerted: 0 }
        );
        feed.assert_async().await;

        assert_eq!(alerted_ids(&h.history), vec![OpportunityId::Int(2)]);
        settings.assert_async().await;
    }

    #[tokio::test]
    async fn test_settings_failure_suppresses_alerts() {
        let mut server = mockito::Server::new_async().await;
        let settings = server
            .mock("GET", "/api/settings")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;
        let mut h = harness(&server, false);

        let feed = serve_feed(&mut server, &[1], 1).await;
        h.poller.poll_once().await;
        feed.remove_async().await;

        let _feed = serve_feed(&mut server, &[2, 1], 1).await;
        assert_eq!(
            h.poller.poll_once().await,
            PollOutcome::Polled { new: 1, alerted: 0 }
        );
        assert!(h.history.is_empty());
        settings.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_poller_unseeded() {
        let mut server = mockito::Server::new_async().await;
        let mut h = harness(&server, false);

        let down = server
            .mock("GET", "/api/opportunities")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        assert_eq!(h.poller.poll_once().await, PollOutcome::FetchFailed);
        down.remove_async().await;

        let _feed = serve_feed(&mut server, &[1], 1).await;
        assert_eq!(h.poller.poll_once().await, PollOutcome::Seeded { count: 1 });
    }

    #[tokio::test]
    async fn test_run_polls_on_first_tick() {
        let mut server = mockito::Server::new_async().await;
        let feed = serve_feed(&mut server, &[1], 1).await;
        let h = harness(&server, false);

        let task = tokio::spawn(h.poller.run());
        tokio::time::sleep(Duration::from_millis(300)).await;
        task.abort();

        feed.assert_async().await;
    }
}
