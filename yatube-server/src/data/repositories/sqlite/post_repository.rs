use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::error::ErrorKind;

use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::group::GroupRef;
use crate::domain::post::{Author, Post};

#[derive(Debug, Clone)]
pub(crate) struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_POSTS: &str = r#"
    SELECT
        p.id,
        p.text,
        p.created_at,
        p.author_id,
        u.username AS author_username,
        p.group_id,
        g.slug AS group_slug,
        g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

const FILTER_POSTS: &str = r#"
    WHERE (? IS NULL OR p.group_id = ?)
      AND (? IS NULL OR p.author_id = ?)
"#;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    text: String,
    created_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_slug: Option<String>,
    group_title: Option<String>,
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (text, created_at, author_id, group_id)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&input.text)
        .bind(input.created_at)
        .bind(input.author_id)
        .bind(input.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.get_post(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("post {id} missing after insert")))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("{SELECT_POSTS} WHERE p.id = ?");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET text = ?,
                group_id = ?
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(&patch.text)
        .bind(patch.group_id)
        .bind(post_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(post_id).await
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let limit = i64::from(pagination.limit);
        let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);

        let sql = format!(
            "{SELECT_POSTS} {FILTER_POSTS} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(filter.group_id())
            .bind(filter.group_id())
            .bind(filter.author_id())
            .bind(filter.author_id())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM posts p {FILTER_POSTS}");
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.group_id())
            .bind(filter.group_id())
            .bind(filter.author_id())
            .bind(filter.author_id())
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let group = match (row.group_id, row.group_slug, row.group_title) {
        (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
        _ => None,
    };
    let author = Author {
        id: row.author_id,
        username: row.author_username,
    };

    Post::new(row.id, row.text, row.created_at, author, group)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && matches!(db_err.kind(), ErrorKind::ForeignKeyViolation)
    {
        return DomainError::not_found("author or group", db_err.message());
    }
    super::unexpected(err)
}
