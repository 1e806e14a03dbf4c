use crate::services::Metrics;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Endpoint label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Wildcard axum appends to `nest_service` mounts.
const NEST_TAIL_PARAM: &str = "/*__private__axum_nest_tail_param";

/// Label for a matched route template, with nested mounts reported by their prefix.
pub fn endpoint_label(matched_path: &str) -> &str {
    match matched_path.split_once(NEST_TAIL_PARAM) {
        Some(("", _)) => "/",
        Some((prefix, _)) => prefix,
        None => matched_path,
    }
}

/// Request lifecycle hooks: active gauge, per-endpoint duration and request count.
pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| endpoint_label(path.as_str()).to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let _active = metrics.start_request();

    let response = next.run(req).await;

    metrics.record_request(
        &method,
        &endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
