use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::domain::user::Actor;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

pub(crate) const SESSION_COOKIE: &str = "session";
pub(crate) const LOGIN_PATH: &str = "/auth/login/";

/// The logged-in user; rejects anonymous requests.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser(pub(crate) Actor);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Whoever is logged in, if anyone.
#[derive(Debug, Clone, Default)]
pub(crate) struct CurrentUser(pub(crate) Option<Actor>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<Actor>().cloned()))
    }
}

/// Puts the `Actor` from a valid session cookie into request extensions.
/// A missing, expired or forged token leaves the request anonymous.
pub(crate) async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match state.jwt.verify(cookie.value()) {
            Ok(actor) => {
                request.extensions_mut().insert(actor);
            }
            Err(err) => debug!(error = %err, "ignoring invalid session cookie"),
        }
    }

    next.run(request).await
}

/// Sends anonymous users to the login page, remembering where they were going.
pub(crate) async fn login_required(request: Request, next: Next) -> Response {
    if request.extensions().get::<Actor>().is_some() {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Redirect::to(&login_url(target)).into_response()
}

pub(crate) fn login_url(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

/// Only local absolute paths are followed after login; anything else goes home.
pub(crate) fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && path.chars().all(|c| c.is_ascii_graphic() && c != '\\') =>
        {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::{login_url, safe_next};

    #[test]
    fn login_url_encodes_return_path() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=%2Fcreate%2F");
        assert_eq!(
            login_url("/posts/1/edit/?x=1"),
            "/auth/login/?next=%2Fposts%2F1%2Fedit%2F%3Fx%3D1"
        );
    }

    #[test]
    fn safe_next_accepts_only_local_paths() {
        assert_eq!(safe_next(Some("/posts/1/edit/")), "/posts/1/edit/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/профиль/")), "/");
        assert_eq!(safe_next(Some("")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
