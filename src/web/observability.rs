//! Request logging, metrics and response hardening.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::{AppState, WebError};

/// Only routed when `observability.metrics_enabled` is set.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    state.prometheus_handle.as_ref().map_or_else(
        || WebError::NotFound.into_response(),
        |handle| handle.render().into_response(),
    )
}

fn outcome(status: u16) -> &'static str {
    match status {
        500.. => "error",
        400..=499 => "client_error",
        300..=399 => "redirect",
        _ => "success",
    }
}

/// Wraps every request in a `request` span and records one
/// `http_request_finished` event plus metrics when it completes.
/// `user_id` is filled in by the login guard once a session is resolved.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    // Route templates ("/topics/{topic_id}/") keep metric labels bounded.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or("unmatched", MatchedPath::as_str)
        .to_owned();

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        route = %route,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        let labels = [
            ("method", method.to_string()),
            ("route", route),
            ("status", status.to_string()),
        ];
        metrics::counter!("learning_log_http_requests_total", &labels).increment(1);
        metrics::histogram!("learning_log_http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            outcome = outcome(status),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

static SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "same-origin"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; script-src 'none'; style-src 'self' 'unsafe-inline'; form-action 'self'; frame-ancestors 'none'; base-uri 'self'",
    ),
];

/// Pages are plain server-rendered HTML with no scripts, so the policy can
/// forbid them outright.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in &SECURITY_HEADERS {
        headers.insert(name.clone(), HeaderValue::from_static(*value));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_buckets() {
        assert_eq!(outcome(200), "success");
        assert_eq!(outcome(303), "redirect");
        assert_eq!(outcome(404), "client_error");
        assert_eq!(outcome(500), "error");
    }
}
