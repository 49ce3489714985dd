use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::group::GroupRef;
use super::user::Actor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) author: Author,
    pub(crate) group: Option<GroupRef>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        author: Author,
        group: Option<GroupRef>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author.id)?;
        let text = normalize_text(&text.into())?;

        Ok(Self {
            id,
            text,
            created_at,
            author,
            group,
        })
    }

    pub(crate) fn group_id(&self) -> Option<i64> {
        self.group.as_ref().map(|group| group.id)
    }
}

/// Text and group as submitted through the post form, shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PostInput {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
}

impl PostInput {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(group_id) = self.group_id {
            validate_positive_i64("group", group_id)?;
        }
        Ok(Self {
            text: normalize_text(&self.text)?,
            group_id: self.group_id,
        })
    }
}

/// Only the author of a post may change it.
pub(crate) fn is_author(actor: &Actor, post: &Post) -> bool {
    actor.user_id == post.author.id
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "Значение должно быть больше нуля."));
    }
    Ok(())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation("text", "Обязательное поле."));
    }
    Ok(text.to_string())
}
