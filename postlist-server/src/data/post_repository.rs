use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{CreatedPost, PageWindow, PagedPosts, Post, PostInput, PostSummary};

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<PostSummary>, DomainError>;
    async fn fetch_by_id(&self, id: &str) -> Result<Vec<Post>, DomainError>;
    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<PostSummary>, DomainError>;
    async fn insert_one(&self, input: PostInput) -> Result<CreatedPost, DomainError>;
    async fn count_all(&self) -> Result<i64, DomainError>;

    /// Reads a listing (`None` lists everything) together with the total row count.
    ///
    /// The default runs two independent statements; backends able to pin both
    /// reads to one snapshot override it.
    async fn list_with_total(&self, window: Option<PageWindow>) -> Result<PagedPosts, DomainError> {
        let posts = match window {
            Some(window) => self.fetch_page(window).await?,
            None => self.fetch_all().await?,
        };
        let total_count = self.count_all().await?;

        Ok(PagedPosts { posts, total_count })
    }
}
