pub mod client;
pub mod types;

pub use client::{ClientError, DashboardClient};
pub use types::ApiStatus;
