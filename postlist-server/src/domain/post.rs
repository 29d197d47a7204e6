use chrono::{DateTime, Utc};

use super::error::DomainError;

pub(crate) const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            created_at,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostSummary {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostInput {
    pub(crate) title: String,
    pub(crate) content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CreatedPost {
    pub(crate) id: i64,
    pub(crate) rows_affected: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PagedPosts {
    pub(crate) posts: Vec<PostSummary>,
    pub(crate) total_count: i64,
}

/// Offset/limit window over posts ordered by `created_at DESC, id DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) offset: i64,
    pub(crate) limit: i64,
}

impl PageWindow {
    pub(crate) fn new(offset: i64, limit: i64) -> Result<Self, DomainError> {
        if offset < 0 {
            return Err(DomainError::Validation {
                field: "offset",
                message: "must be >= 0",
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(DomainError::Validation {
                field: "limit",
                message: "must be 1..100",
            });
        }
        Ok(Self { offset, limit })
    }
}
