use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Group {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

/// Enough of a group to render a link to its listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GroupRef {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
}

impl From<&Group> for GroupRef {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            slug: group.slug.clone(),
            title: group.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct NewGroupRequest {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl NewGroupRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > 200 {
            return Err(DomainError::validation("title", "must be 1..200 chars"));
        }

        Ok(Self {
            title: title.to_string(),
            slug: normalize_slug(&self.slug)?,
            description: self.description.trim().to_string(),
        })
    }
}

pub(crate) fn normalize_slug(slug: &str) -> Result<String, DomainError> {
    let slug = slug.trim();
    if slug.is_empty() || slug.len() > 50 {
        return Err(DomainError::validation("slug", "must be 1..50 chars"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::validation(
            "slug",
            "may contain only latin letters, digits, '-' and '_'",
        ));
    }
    Ok(slug.to_string())
}
