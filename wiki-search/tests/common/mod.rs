#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiki_search::config::Settings;
use wiki_search::services::{LookupError, Metrics, SummaryProvider};
use wiki_search::startup::{build_router, Application};
use wiki_search::AppState;

enum StubEntry {
    Summary(String),
    Ambiguous,
    Unreachable,
}

/// In-memory stand-in for Wikipedia. Unknown terms are not found.
#[derive(Default)]
pub struct StubProvider {
    entries: HashMap<String, StubEntry>,
    delay: Option<Duration>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, term: &str, summary: &str) -> Self {
        self.entries
            .insert(term.to_string(), StubEntry::Summary(summary.to_string()));
        self
    }

    pub fn with_ambiguous(mut self, term: &str) -> Self {
        self.entries.insert(term.to_string(), StubEntry::Ambiguous);
        self
    }

    pub fn with_unreachable(mut self, term: &str) -> Self {
        self.entries.insert(term.to_string(), StubEntry::Unreachable);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SummaryProvider for StubProvider {
    async fn summary(&self, term: &str) -> Result<String, LookupError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.entries.get(term) {
            Some(StubEntry::Summary(text)) => Ok(text.clone()),
            Some(StubEntry::Ambiguous) => Err(LookupError::Ambiguous(term.to_string())),
            Some(StubEntry::Unreachable) => {
                Err(LookupError::Transport("connection refused".to_string()))
            }
            None => Err(LookupError::NotFound(term.to_string())),
        }
    }
}

/// Default catalogue used by most tests.
pub fn stub_provider() -> StubProvider {
    StubProvider::new()
        .with_summary("Rust", "Rust is a general-purpose programming language.")
        .with_summary("Ferris", "Ferris is a crab.")
        .with_ambiguous("Mercury")
        .with_unreachable("Timeout")
}

/// Router plus the registry it writes to, for `oneshot` tests.
pub fn test_router(provider: StubProvider) -> (Router, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
    let state = AppState::new(metrics.clone(), Arc::new(provider));
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("ico");
    (build_router(state, &static_dir), metrics)
}

pub fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn search_request(term: &str) -> Request<Body> {
    let body = serde_urlencoded::to_string([("search", term)]).unwrap();
    form_request(&body)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub struct TestApp {
    pub address: String,
    pub metrics_address: String,
    pub metrics: Arc<Metrics>,
}

impl TestApp {
    pub async fn spawn(provider: StubProvider) -> Self {
        let mut settings = Settings::default();
        settings.server.host = "127.0.0.1".to_string();
        settings.server.port = 0; // Random port for testing
        settings.metrics.host = "127.0.0.1".to_string();
        settings.metrics.port = 0;

        let app = Application::build(settings, Arc::new(provider))
            .await
            .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());
        let metrics_address = format!("http://127.0.0.1:{}", app.metrics_port());
        let metrics = app.metrics();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to answer before handing it to the test
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            metrics_address,
            metrics,
        }
    }
}
