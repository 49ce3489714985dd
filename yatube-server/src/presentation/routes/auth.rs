use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{login, login_form, logout, signup, signup_form};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(signup_form).post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout).post(logout))
}
