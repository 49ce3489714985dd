use std::time::Duration;

use axum::{Router, http::StatusCode};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::infrastructure::settings::Settings;

/// Body size, in-flight request and per-request time limits from settings.
pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(settings.http_request_body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(settings.http_request_timeout_secs),
        ))
        .layer(ConcurrencyLimitLayer::new(settings.http_concurrency_limit))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
    };
    use tower::ServiceExt;

    use super::apply_limits;
    use crate::infrastructure::settings::Settings;

    fn limited_router() -> Router {
        let env: HashMap<String, String> = [
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("HTTP_REQUEST_TIMEOUT_SECS", "1"),
            ("HTTP_REQUEST_BODY_LIMIT_BYTES", "16"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let settings = Settings::from_lookup(|key| env.get(key).cloned()).expect("must parse");

        let router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .route("/echo", post(|body: String| async move { body }));
        apply_limits(router, &settings)
    }

    #[tokio::test]
    async fn slow_request_times_out_with_408() {
        let response = limited_router()
            .oneshot(Request::get("/slow").body(Body::empty()).expect("request"))
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_with_413() {
        let response = limited_router()
            .oneshot(
                Request::post("/echo")
                    .header("content-length", "64")
                    .body(Body::from("x".repeat(64)))
                    .expect("request"),
            )
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = limited_router()
            .oneshot(Request::post("/echo").body(Body::from("short")).expect("request"))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
