pub mod app;
pub mod metrics;
