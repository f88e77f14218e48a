use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use super::MetricsRegistry;

/// Records request count and latency per route. Matched requests are
/// labelled with their route template; unmatched ones fall back to the
/// normalized URI path.
pub async fn metrics_middleware(
    State(metrics): State<Arc<MetricsRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = route_label(&req);

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    metrics
        .http_requests_total
        .with_label_values(&[&method, &path, &status])
        .inc();

    metrics
        .http_request_duration_seconds
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

fn route_label(req: &Request) -> String {
    match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(req.uri().path()),
    }
}

/// Collapses ids and tokens to `:id` to keep label cardinality bounded.
/// /api/hotels/550e8400-... -> /api/hotels/:id
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| if is_id_like(segment) { ":id" } else { segment })
        .collect();

    format!("/{}", normalized.join("/"))
}

fn is_id_like(segment: &str) -> bool {
    // UUID
    if segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4 {
        return true;
    }

    if segment.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    // Hex tokens (verification and reset tokens are 64 chars)
    segment.len() >= 32 && segment.chars().all(|c| c.is_ascii_hexdigit())
}
