use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) group_id: Option<i64>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostPatch {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
}

/// Rows to fetch for one page, taken from `PageWindow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) limit: u32,
    pub(crate) offset: u64,
}

/// Which posts a listing covers. Listings are always newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostFilter {
    All,
    Group(i64),
    Author(i64),
}

impl PostFilter {
    pub(crate) fn group_id(self) -> Option<i64> {
        match self {
            PostFilter::Group(id) => Some(id),
            _ => None,
        }
    }

    pub(crate) fn author_id(self) -> Option<i64> {
        match self {
            PostFilter::Author(id) => Some(id),
            _ => None,
        }
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Writes only when `owner_id` is the post's author; `None` otherwise.
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError>;
}
