use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Request latency buckets, in seconds.
const HTTP_DURATION_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.0, 5.0];

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process and return a handle
/// whose `render()` produces the scrape payload. Later calls reuse it.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE.get_or_init(install).clone()
}

fn install() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let builder = match builder.set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        HTTP_DURATION_BUCKETS,
    ) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "invalid histogram buckets, using summaries");
            PrometheusBuilder::new()
        }
    };

    let recorder = builder.build_recorder();
    let handle = recorder.handle();
    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("a metrics recorder is already installed");
    }

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "Duration of HTTP requests in seconds"
    );
    describe_counter!("analytics_events_total", "Analytics events accepted");
    describe_counter!("cache_hits_total", "Cache reads served from the store");
    describe_counter!("cache_misses_total", "Cache reads that went upstream");
    describe_counter!("cache_errors_total", "Cache store failures");

    // Pre-register so the series appear before the first request.
    counter!("cache_hits_total").absolute(0);
    counter!("cache_misses_total").absolute(0);
    counter!("cache_errors_total").absolute(0);

    handle
}

/// Records `http_requests_total` and `http_request_duration_seconds` for
/// every routed request, labelled by method, matched route and status.
pub async fn track_http(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status_code" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "route" => route,
        "status_code" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}
