//! Prometheus metrics for wiki-search.
//!
//! One [`Metrics`] value is built at startup and shared by `Arc` with every
//! handler, the lifecycle middleware and the standalone scrape listener.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Label value for failed Wikipedia lookups on `app_errors_total`.
pub const WIKIPEDIA_SEARCH_ERROR: &str = "wikipedia_search";

/// Outcome label on `wikipedia_searches_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Success,
    Error,
}

impl SearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Success => "success",
            SearchStatus::Error => "error",
        }
    }
}

/// Holds one unit of `active_requests` until dropped, including when the
/// request future is cancelled.
pub struct ActiveRequest {
    gauge: IntGauge,
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    wikipedia_searches_total: IntCounterVec,
    wikipedia_search_duration_seconds: Histogram,
    active_requests: IntGauge,
    app_errors_total: IntCounterVec,
}

impl Metrics {
    /// Create and register every instrument on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["endpoint"],
        )?;

        let wikipedia_searches_total = IntCounterVec::new(
            Opts::new("wikipedia_searches_total", "Total Wikipedia searches"),
            &["status"],
        )?;

        let wikipedia_search_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "wikipedia_search_duration_seconds",
            "Wikipedia search duration in seconds",
        ))?;

        let active_requests = IntGauge::new("active_requests", "Currently active requests")?;

        let app_errors_total = IntCounterVec::new(
            Opts::new("app_errors_total", "Total application errors"),
            &["error_type"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(wikipedia_searches_total.clone()))?;
        registry.register(Box::new(wikipedia_search_duration_seconds.clone()))?;
        registry.register(Box::new(active_requests.clone()))?;
        registry.register(Box::new(app_errors_total.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        // Labelled families are only exported once a child exists; start these at zero.
        for status in [SearchStatus::Success, SearchStatus::Error] {
            wikipedia_searches_total.with_label_values(&[status.as_str()]);
        }
        app_errors_total.with_label_values(&[WIKIPEDIA_SEARCH_ERROR]);

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            wikipedia_searches_total,
            wikipedia_search_duration_seconds,
            active_requests,
            app_errors_total,
        })
    }

    pub fn start_request(&self) -> ActiveRequest {
        self.active_requests.inc();
        ActiveRequest {
            gauge: self.active_requests.clone(),
        }
    }

    pub fn record_request(&self, method: &str, endpoint: &str, status_code: u16, secs: f64) {
        self.http_request_duration_seconds
            .with_label_values(&[endpoint])
            .observe(secs);
        let status_code = status_code.to_string();
        self.http_requests_total
            .with_label_values(&[method, endpoint, status_code.as_str()])
            .inc();
    }

    pub fn record_search(&self, status: SearchStatus, secs: f64) {
        self.wikipedia_search_duration_seconds.observe(secs);
        self.wikipedia_searches_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    pub fn record_error(&self, error_type: &str) {
        self.app_errors_total.with_label_values(&[error_type]).inc();
    }

    pub fn active_requests(&self) -> i64 {
        self.active_requests.get()
    }

    pub fn searches(&self, status: SearchStatus) -> u64 {
        self.wikipedia_searches_total
            .with_label_values(&[status.as_str()])
            .get()
    }

    pub fn errors(&self, error_type: &str) -> u64 {
        self.app_errors_total.with_label_values(&[error_type]).get()
    }

    pub fn requests(&self, method: &str, endpoint: &str, status_code: u16) -> u64 {
        let status_code = status_code.to_string();
        self.http_requests_total
            .with_label_values(&[method, endpoint, status_code.as_str()])
            .get()
    }

    /// Serialize every registered family in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
