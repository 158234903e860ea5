//! Backend of the CI pipeline duration forecasting dashboard.

pub mod analytics;
pub mod dataset;
pub mod error;
pub mod gateway;
pub mod insights;
pub mod server;
pub mod telemetry;
