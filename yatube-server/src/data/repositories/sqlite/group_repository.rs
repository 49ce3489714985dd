use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::error::ErrorKind;

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::domain::error::DomainError;
use crate::domain::group::Group;

#[derive(Debug, Clone)]
pub(crate) struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    title: String,
    slug: String,
    description: String,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
        }
    }
}

#[async_trait]
impl GroupRepository for SqliteGroupRepository {
    async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO post_groups (title, slug, description)
            VALUES (?, ?, ?)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        Ok(row.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        Ok(row.map(Group::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM post_groups WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        Ok(row.map(Group::from))
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        Ok(rows.into_iter().map(Group::from).collect())
    }
}

fn map_group_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && matches!(db_err.kind(), ErrorKind::UniqueViolation)
    {
        return DomainError::AlreadyExists("slug");
    }
    super::unexpected(err)
}
