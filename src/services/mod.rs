pub mod opportunity_poller;

pub use opportunity_poller::{run_opportunity_poller, OpportunityPoller, PollOutcome, PollerConfig};
