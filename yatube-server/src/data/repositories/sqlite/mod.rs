pub(crate) mod group_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;

use crate::domain::error::DomainError;

pub(crate) use group_repository::SqliteGroupRepository;
pub(crate) use post_repository::SqlitePostRepository;
pub(crate) use user_repository::SqliteUserRepository;

fn unexpected(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
