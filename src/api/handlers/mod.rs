pub mod alerts;
pub mod control;
pub mod health;
pub mod metrics;
pub mod opportunities;
pub mod scanner;
pub mod settings;
pub mod ws;
