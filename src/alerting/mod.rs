pub mod policy;

pub use policy::{AlertPolicy, AlertRejection, MIN_ALERT_INTERVAL};
