pub mod config;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;

use axum::extract::FromRef;
use services::{Metrics, SummaryProvider};
use std::sync::Arc;

/// Shared application state: the metrics registry and the summary backend.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub provider: Arc<dyn SummaryProvider>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, provider: Arc<dyn SummaryProvider>) -> Self {
        Self { metrics, provider }
    }
}
