use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::post::{PagedPosts, Post, PostInput, PostSummary};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{JsonBody, QueryParams};

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreatePostDto {
    pub(crate) title: String,
    #[serde(rename = "contentHtml")]
    pub(crate) content: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub(crate) struct PaginationQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 0))]
    pub(crate) offset: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    #[serde(rename = "contentHtml")]
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostSummaryDto {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostListResponseDto {
    #[serde(rename = "allPosts")]
    pub(crate) posts: Vec<PostSummaryDto>,
    #[serde(rename = "totalCount")]
    pub(crate) total_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CreatePostResponseDto {
    pub(crate) status: String,
    pub(crate) data: String,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            created_at: post.created_at,
            updated_at: post.updated_at,
            content: post.content,
        }
    }
}

impl From<PostSummary> for PostSummaryDto {
    fn from(summary: PostSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            created_at: summary.created_at,
        }
    }
}

impl From<PagedPosts> for PostListResponseDto {
    fn from(result: PagedPosts) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostSummaryDto::from).collect(),
            total_count: result.total_count,
        }
    }
}

impl From<CreatePostDto> for PostInput {
    fn from(dto: CreatePostDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, got {value:?}"))),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/postlist",
    tag = "posts",
    responses(
        (status = 200, description = "All post summaries", body = PostListResponseDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_all_posts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<PostListResponseDto>)> {
    let result = state.post_service.list_all().await?;
    info!(
        returned = result.posts.len(),
        total_count = result.total_count,
        "all posts found"
    );

    Ok((StatusCode::OK, Json(PostListResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(
        ("offset" = Option<i64>, Query, description = "Rows to skip (>= 0, default 0)"),
        ("limit" = Option<i64>, Query, description = "Page size (1..=100, default PER_PAGE)")
    ),
    responses(
        (status = 200, description = "Page of post summaries, newest first", body = PostListResponseDto),
        (status = 400, description = "Invalid offset or limit"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PaginationQuery>,
) -> AppResult<(StatusCode, Json<PostListResponseDto>)> {
    query.validate()?;

    let result = state
        .post_service
        .list_page(query.offset, query.limit)
        .await?;
    info!(
        returned = result.posts.len(),
        total_count = result.total_count,
        "posts found"
    );

    Ok((StatusCode::OK, Json(PostListResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/post/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Matching posts, empty when the id is unknown", body = [PostDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<PostDto>>)> {
    let posts = state.post_service.get_post(&id).await?;
    info!(post_id = %id, found = posts.len(), "post lookup");

    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/post",
    tag = "posts",
    request_body = CreatePostDto,
    responses(
        (status = 200, description = "Post created; `location` points at the new post", body = CreatePostResponseDto),
        (status = 400, description = "Malformed body"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CreatePostDto>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<CreatePostResponseDto>)> {
    let created = state.post_service.create_post(dto.into()).await?;
    info!(
        post_id = created.id,
        rows_affected = created.rows_affected,
        "post created"
    );

    let location = format!("{}/posts/{}", state.front_url, created.id);
    Ok((
        StatusCode::OK,
        [(header::LOCATION, location)],
        Json(CreatePostResponseDto {
            status: "200".to_string(),
            data: "success".to_string(),
        }),
    ))
}
