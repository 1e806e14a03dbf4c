use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{app_directory, resolve_path, Settings};
use crate::handlers::{
    app::{health_check, index, search},
    metrics::metrics,
};
use crate::middleware::metrics::metrics_middleware;
use crate::services::{Metrics, SummaryProvider};
use crate::AppState;

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index).post(search))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn_with_state(state.metrics.clone(), metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Standalone scrape server. Answers every GET path with the exposition text
/// and bypasses the request lifecycle hooks.
pub fn metrics_router(metrics_registry: Arc<Metrics>) -> Router {
    Router::new()
        .fallback(get(metrics))
        .with_state(metrics_registry)
}

pub struct Application {
    port: u16,
    metrics_port: u16,
    listener: TcpListener,
    metrics_listener: TcpListener,
    router: Router,
    metrics_router: Router,
    metrics: Arc<Metrics>,
}

impl Application {
    /// Bind both listeners. The metrics listener is bound first so it is
    /// ready before the application accepts traffic.
    pub async fn build(
        settings: Settings,
        provider: Arc<dyn SummaryProvider>,
    ) -> Result<Self, AppError> {
        let metrics = Arc::new(Metrics::new().map_err(|e| {
            tracing::error!("Failed to create metrics registry: {}", e);
            AppError::InternalError(anyhow::Error::new(e))
        })?);

        let metrics_listener = bind(&settings.metrics.host, settings.metrics.port).await?;
        let metrics_port = metrics_listener.local_addr()?.port();
        tracing::info!("Metrics endpoint listening on port {}", metrics_port);

        let static_dir = resolve_path(&app_directory()?, &settings.server.static_dir);
        let state = AppState::new(metrics.clone(), provider);
        let router = build_router(state, &static_dir);

        let listener = bind(&settings.server.host, settings.server.port).await?;
        let port = listener.local_addr()?.port();
        tracing::info!("Starting wiki-search on port {}", port);

        Ok(Self {
            port,
            metrics_port,
            listener,
            metrics_listener,
            router,
            metrics_router: metrics_router(metrics.clone()),
            metrics,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn metrics_port(&self) -> u16 {
        self.metrics_port
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Serve until SIGINT/SIGTERM. The app server drains in-flight requests;
    /// the metrics server stops with it.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app_server = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();
        let metrics_server = axum::serve(self.metrics_listener, self.metrics_router).into_future();

        tokio::select! {
            result = app_server => {
                if let Err(e) = &result {
                    tracing::error!("Server error: {}", e);
                }
                result
            }
            result = metrics_server => {
                if let Err(e) = &result {
                    tracing::error!("Metrics server error: {}", e);
                }
                result
            }
        }
    }
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, AppError> {
    let address = format!("{}:{}", host, port);
    let addr: SocketAddr = address.parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid listen address {}: {}", address, e))
    })?;

    TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
        AppError::from(e)
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
