use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
};
use serde::Serialize;
use tracing::error;

use super::app_error::error_page;
use super::middleware::auth::{CurrentUser, session_middleware};
use super::templates::Nav;
use super::{AppState, routes};

pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .merge(routes::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthzResponse>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(HealthzResponse { status: "ok" })),
        Err(err) => {
            error!(error = %err, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthzResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}

async fn not_found(CurrentUser(actor): CurrentUser) -> Response {
    error_page(StatusCode::NOT_FOUND, Nav::new(actor.as_ref()))
}
