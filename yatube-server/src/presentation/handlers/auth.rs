use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::presentation::AppState;
use crate::presentation::app_error::{AppResult, render};
use crate::presentation::forms::{FormErrors, LoginForm, SignupForm};
use crate::presentation::middleware::auth::{CurrentUser, SESSION_COOKIE, safe_next};
use crate::presentation::templates::{LoginTemplate, Nav, SignupTemplate};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NextQuery {
    pub(crate) next: Option<String>,
}

pub(crate) async fn signup_form(CurrentUser(actor): CurrentUser) -> AppResult<Html<String>> {
    render(&SignupTemplate::new(
        Nav::new(actor.as_ref()),
        &SignupForm::default(),
        &FormErrors::default(),
    ))
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return rerender_signup(&form, FormErrors::from(&errors));
    }

    match state.auth_service.register(form.to_request()).await {
        Ok(result) => {
            let jar = jar.add(session_cookie(result.session_token, state.session_cookie_secure));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => rerender_signup(&form, errors),
            None => Err(err.into()),
        },
    }
}

pub(crate) async fn login_form(
    CurrentUser(actor): CurrentUser,
    Query(query): Query<NextQuery>,
) -> AppResult<Html<String>> {
    render(&LoginTemplate::new(
        Nav::new(actor.as_ref()),
        &LoginForm::default(),
        safe_next(query.next.as_deref()),
        &FormErrors::default(),
    ))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = safe_next(form.next.as_deref());
    if let Err(errors) = form.validate() {
        return rerender_login(&form, next, FormErrors::from(&errors));
    }

    match state.auth_service.login(form.to_request()).await {
        Ok(result) => {
            info!(user_id = result.user.id, "user logged in");
            let jar = jar.add(session_cookie(result.session_token, state.session_cookie_secure));
            Ok((jar, Redirect::to(next)).into_response())
        }
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => rerender_login(&form, next, errors),
            None => Err(err.into()),
        },
    }
}

pub(crate) async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn rerender_signup(form: &SignupForm, errors: FormErrors) -> AppResult<Response> {
    let page = render(&SignupTemplate::new(Nav::default(), form, &errors))?;
    Ok(page.into_response())
}

fn rerender_login(form: &LoginForm, next: &str, errors: FormErrors) -> AppResult<Response> {
    let page = render(&LoginTemplate::new(Nav::default(), form, next, &errors))?;
    Ok(page.into_response())
}
