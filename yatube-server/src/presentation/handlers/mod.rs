use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::domain::page::parse_page_number;
use crate::presentation::app_error::AppError;

pub(crate) mod auth;
pub(crate) mod posts;

/// `?page=N`; anything unparsable means the first page.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

impl PageQuery {
    pub(crate) fn number(&self) -> i64 {
        parse_page_number(self.page.as_deref())
    }
}

/// Numeric `{id}` path segment; anything else is a 404 rather than a 400.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PostId(pub(crate) i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(PostId(id))
    }
}
