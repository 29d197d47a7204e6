use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatedPost, PageWindow, PagedPosts, Post, PostInput, PostSummary};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PostSummaryRow {
    id: i64,
    title: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn fetch_all(&self) -> Result<Vec<PostSummary>, DomainError> {
        let rows = select_all(&self.pool)
            .await
            .map_err(|err| map_post_db_error("fetch_all", err))?;

        Ok(rows.into_iter().map(map_row_to_summary).collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Vec<Post>, DomainError> {
        let context = format!("fetch_by_id {id:?}");

        // ids are generated by BIGSERIAL, so anything that does not print back
        // to the same string cannot match a row
        let numeric_id = match id.parse::<i64>() {
            Ok(value) if value.to_string() == id => value,
            _ => return Ok(Vec::new()),
        };

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                id,
                title,
                content,
                created_at,
                updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(numeric_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| map_post_db_error(&context, err))?;

        rows.into_iter()
            .map(|row| map_row_to_post(&context, row))
            .collect()
    }

    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<PostSummary>, DomainError> {
        let rows = select_page(&self.pool, window)
            .await
            .map_err(|err| map_post_db_error("fetch_page", err))?;

        Ok(rows.into_iter().map(map_row_to_summary).collect())
    }

    async fn insert_one(&self, input: PostInput) -> Result<CreatedPost, DomainError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (title, content)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| map_post_db_error("insert_one", err))?;

        let id = ids
            .first()
            .copied()
            .ok_or_else(|| DomainError::Storage("insert_one: no id returned".to_string()))?;

        Ok(CreatedPost {
            id,
            rows_affected: ids.len() as u64,
        })
    }

    async fn count_all(&self) -> Result<i64, DomainError> {
        select_count(&self.pool)
            .await
            .map_err(|err| map_post_db_error("count_all", err))
    }

    async fn list_with_total(&self, window: Option<PageWindow>) -> Result<PagedPosts, DomainError> {
        let context = "list_with_total";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_post_db_error(context, err))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|err| map_post_db_error(context, err))?;

        let rows = match window {
            Some(window) => select_page(&mut *tx, window).await,
            None => select_all(&mut *tx).await,
        }
        .map_err(|err| map_post_db_error(context, err))?;

        let total_count = select_count(&mut *tx)
            .await
            .map_err(|err| map_post_db_error(context, err))?;

        tx.commit()
            .await
            .map_err(|err| map_post_db_error(context, err))?;

        Ok(PagedPosts {
            posts: rows.into_iter().map(map_row_to_summary).collect(),
            total_count,
        })
    }
}

async fn select_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<PostSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, PostSummaryRow>(
        r#"
        SELECT id, title, created_at
        FROM posts
        "#,
    )
    .fetch_all(executor)
    .await
}

async fn select_page<'e, E: PgExecutor<'e>>(
    executor: E,
    window: PageWindow,
) -> Result<Vec<PostSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, PostSummaryRow>(
        r#"
        SELECT id, title, created_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        LIMIT $1
        OFFSET $2
        "#,
    )
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(executor)
    .await
}

async fn select_count<'e, E: PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(executor)
        .await
}

fn map_row_to_post(context: &str, row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id.to_string(),
        row.title,
        row.content,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::mapping(context, err))
}

fn map_row_to_summary(row: PostSummaryRow) -> PostSummary {
    PostSummary {
        id: row.id.to_string(),
        title: row.title,
        created_at: row.created_at,
    }
}

fn map_post_db_error(context: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => DomainError::mapping(context, err),
        _ => DomainError::Storage(format!("{context}: {err}")),
    }
}
