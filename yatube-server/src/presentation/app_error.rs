use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::error::DomainError;
use crate::presentation::templates::{ErrorTemplate, Nav};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("template rendering failed")]
    Template(#[from] askama::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

pub(crate) fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    template.render().map(Html).map_err(AppError::Template)
}

pub(crate) fn error_page(status: StatusCode, nav: Nav) -> Response {
    let (title, message) = match status {
        StatusCode::NOT_FOUND => ("Страница не найдена", "Такой страницы нет или она была удалена."),
        StatusCode::FORBIDDEN => ("Доступ запрещён", "У вас нет прав на это действие."),
        StatusCode::BAD_REQUEST => ("Неверный запрос", "Сервер не смог обработать запрос."),
        _ => ("Ошибка сервера", "Что-то пошло не так, попробуйте позже."),
    };
    let template = ErrorTemplate {
        nav,
        status: status.as_u16(),
        title,
        message,
    };

    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            error!(error = %err, "error page rendering failed");
            (status, title).into_response()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Domain(err) => match err {
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Forbidden => StatusCode::FORBIDDEN,
                DomainError::Validation { .. }
                | DomainError::AlreadyExists(_)
                | DomainError::InvalidCredentials => StatusCode::BAD_REQUEST,
                DomainError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => return Redirect::to("/auth/login/").into_response(),
            AppError::Template(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = ?self, "request failed");
        } else if status != StatusCode::NOT_FOUND {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        error_page(status, Nav::default())
    }
}
