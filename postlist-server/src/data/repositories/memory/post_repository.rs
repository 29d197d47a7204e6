use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatedPost, PageWindow, PagedPosts, Post, PostInput, PostSummary};

/// Process-local post store. Contents are lost on restart.
#[derive(Debug, Default)]
pub(crate) struct InMemoryPostRepository {
    store: RwLock<MemoryStore>,
}

#[derive(Debug, Default)]
struct MemoryStore {
    rows: Vec<StoredPost>,
    last_id: i64,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore {
    fn summaries(&self) -> Vec<PostSummary> {
        self.rows.iter().map(to_summary).collect()
    }

    fn page(&self, window: PageWindow) -> Vec<PostSummary> {
        let mut ordered: Vec<&StoredPost> = self.rows.iter().collect();
        ordered.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        ordered
            .into_iter()
            .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(0))
            .map(to_summary)
            .collect()
    }

    fn count(&self) -> i64 {
        self.rows.len() as i64
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn fetch_all(&self) -> Result<Vec<PostSummary>, DomainError> {
        Ok(self.store.read().await.summaries())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Vec<Post>, DomainError> {
        let context = format!("fetch_by_id {id:?}");
        let store = self.store.read().await;

        store
            .rows
            .iter()
            .filter(|row| row.id.to_string() == id)
            .map(|row| {
                Post::new(
                    row.id.to_string(),
                    row.title.clone(),
                    row.content.clone(),
                    row.created_at,
                    row.updated_at,
                )
                .map_err(|err| DomainError::mapping(&context, err))
            })
            .collect()
    }

    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<PostSummary>, DomainError> {
        Ok(self.store.read().await.page(window))
    }

    async fn insert_one(&self, input: PostInput) -> Result<CreatedPost, DomainError> {
        let mut store = self.store.write().await;

        // created_at never goes backwards even if the wall clock does
        let now = Utc::now();
        let created_at = store
            .rows
            .last()
            .map_or(now, |last| last.created_at.max(now));

        store.last_id += 1;
        let id = store.last_id;
        store.rows.push(StoredPost {
            id,
            title: input.title,
            content: input.content,
            created_at,
            updated_at: created_at,
        });

        Ok(CreatedPost {
            id,
            rows_affected: 1,
        })
    }

    async fn count_all(&self) -> Result<i64, DomainError> {
        Ok(self.store.read().await.count())
    }

    async fn list_with_total(&self, window: Option<PageWindow>) -> Result<PagedPosts, DomainError> {
        let store = self.store.read().await;
        let posts = match window {
            Some(window) => store.page(window),
            None => store.summaries(),
        };

        Ok(PagedPosts {
            posts,
            total_count: store.count(),
        })
    }
}

fn to_summary(row: &StoredPost) -> PostSummary {
    PostSummary {
        id: row.id.to_string(),
        title: row.title.clone(),
        created_at: row.created_at,
    }
}
