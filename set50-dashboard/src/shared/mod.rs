/// Shared modules for the SET50 dashboard
pub mod aggregation;
pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod levels;
pub mod provider;
pub mod types;
pub mod widget;
