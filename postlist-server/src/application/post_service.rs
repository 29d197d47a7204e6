use std::sync::Arc;

use tracing::debug;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatedPost, PageWindow, PagedPosts, Post, PostInput};

pub(crate) struct PostService {
    repo: Arc<dyn PostRepository>,
    page_size: i64,
}

impl PostService {
    pub(crate) fn new(repo: Arc<dyn PostRepository>, page_size: i64) -> Self {
        Self { repo, page_size }
    }

    pub(crate) async fn list_all(&self) -> Result<PagedPosts, DomainError> {
        self.repo.list_with_total(None).await
    }

    /// Missing `offset` falls back to 0 and missing `limit` to the configured page size.
    pub(crate) async fn list_page(
        &self,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PagedPosts, DomainError> {
        let window = PageWindow::new(offset.unwrap_or(0), limit.unwrap_or(self.page_size))?;
        debug!(offset = window.offset, limit = window.limit, "listing posts page");

        self.repo.list_with_total(Some(window)).await
    }

    pub(crate) async fn get_post(&self, id: &str) -> Result<Vec<Post>, DomainError> {
        self.repo.fetch_by_id(id).await
    }

    pub(crate) async fn create_post(&self, input: PostInput) -> Result<CreatedPost, DomainError> {
        self.repo.insert_one(input).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::PostService;
    use crate::data::post_repository::PostRepository;
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatedPost, PageWindow, Post, PostInput, PostSummary};

    #[derive(Clone)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<PostInput>>>,
        page_call: Arc<Mutex<Option<PageWindow>>>,
        fetch_all_calls: Arc<Mutex<usize>>,
        post_for_get: Arc<Mutex<Vec<Post>>>,
        list_result: Arc<Mutex<Vec<PostSummary>>>,
        total_result: Arc<Mutex<i64>>,
    }

    impl FakePostRepo {
        fn new() -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                page_call: Arc::new(Mutex::new(None)),
                fetch_all_calls: Arc::new(Mutex::new(0)),
                post_for_get: Arc::new(Mutex::new(Vec::new())),
                list_result: Arc::new(Mutex::new(Vec::new())),
                total_result: Arc::new(Mutex::new(0)),
            }
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn fetch_all(&self) -> Result<Vec<PostSummary>, DomainError> {
            *self
                .fetch_all_calls
                .lock()
                .expect("fetch_all_calls mutex poisoned") += 1;
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn fetch_by_id(&self, _id: &str) -> Result<Vec<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn fetch_page(&self, window: PageWindow) -> Result<Vec<PostSummary>, DomainError> {
            *self.page_call.lock().expect("page_call mutex poisoned") = Some(window);
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn insert_one(&self, input: PostInput) -> Result<CreatedPost, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input);
            Ok(CreatedPost {
                id: 11,
                rows_affected: 1,
            })
        }

        async fn count_all(&self) -> Result<i64, DomainError> {
            Ok(*self
                .total_result
                .lock()
                .expect("total_result mutex poisoned"))
        }
    }

    fn service(repo: &FakePostRepo) -> PostService {
        PostService::new(Arc::new(repo.clone()), 10)
    }

    #[tokio::test]
    async fn list_page_defaults_to_configured_page_size() {
        let repo = FakePostRepo::new();
        service(&repo)
            .list_page(None, None)
            .await
            .expect("list_page must succeed");

        let window = repo
            .page_call
            .lock()
            .expect("page_call mutex poisoned")
            .expect("fetch_page must be called");
        assert_eq!(window, PageWindow { offset: 0, limit: 10 });
    }

    #[tokio::test]
    async fn list_page_fills_only_the_missing_parameter() {
        let repo = FakePostRepo::new();
        service(&repo)
            .list_page(Some(20), None)
            .await
            .expect("list_page must succeed");

        let window = repo
            .page_call
            .lock()
            .expect("page_call mutex poisoned")
            .expect("fetch_page must be called");
        assert_eq!(window, PageWindow { offset: 20, limit: 10 });
    }

    #[tokio::test]
    async fn list_page_rejects_negative_offset_before_repo_call() {
        let repo = FakePostRepo::new();
        let err = service(&repo)
            .list_page(Some(-5), Some(10))
            .await
            .expect_err("negative offset must be rejected");

        assert!(matches!(err, DomainError::Validation { field: "offset", .. }));
        assert!(repo.page_call.lock().expect("poisoned").is_none());
    }

    #[tokio::test]
    async fn list_page_combines_page_and_total() {
        let repo = FakePostRepo::new();
        *repo.list_result.lock().expect("list_result mutex poisoned") = vec![PostSummary {
            id: "1".to_string(),
            title: "a".to_string(),
            created_at: Utc::now(),
        }];
        *repo
            .total_result
            .lock()
            .expect("total_result mutex poisoned") = 25;

        let result = service(&repo)
            .list_page(Some(0), Some(1))
            .await
            .expect("list_page must succeed");

        assert_eq!(result.total_count, 25);
        assert_eq!(result.posts.len(), 1);
    }

    #[tokio::test]
    async fn list_all_reads_every_post() {
        let repo = FakePostRepo::new();
        *repo
            .total_result
            .lock()
            .expect("total_result mutex poisoned") = 3;

        let result = service(&repo).list_all().await.expect("list_all");

        assert_eq!(result.total_count, 3);
        assert_eq!(*repo.fetch_all_calls.lock().expect("poisoned"), 1);
        assert!(repo.page_call.lock().expect("poisoned").is_none());
    }

    #[tokio::test]
    async fn create_post_passes_input_through_unchanged() {
        let repo = FakePostRepo::new();
        let created = service(&repo)
            .create_post(PostInput {
                title: "  A ".to_string(),
                content: "<p>x</p>".to_string(),
            })
            .await
            .expect("create_post must succeed");
        assert_eq!(created.id, 11);

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.title, "  A ");
        assert_eq!(input.content, "<p>x</p>");
    }

    #[tokio::test]
    async fn get_post_returns_empty_when_missing() {
        let repo = FakePostRepo::new();
        let posts = service(&repo).get_post("42").await.expect("must not fail");
        assert!(posts.is_empty());
    }
}
