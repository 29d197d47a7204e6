use utoipa::OpenApi;

use crate::presentation::http::app_error::ErrorBody;
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::posts::{
    CreatePostDto, CreatePostResponseDto, PaginationQuery, PostDto, PostListResponseDto,
    PostSummaryDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::health_handler,
        crate::presentation::http::handlers::posts::list_all_posts,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post
    ),
    components(
        schemas(
            CreatePostDto,
            CreatePostResponseDto,
            PaginationQuery,
            PostDto,
            PostSummaryDto,
            PostListResponseDto,
            ErrorBody,
            HealthzResponse
        )
    ),
    tags(
        (name = "posts", description = "Post endpoints"),
        (name = "health", description = "Liveness probe")
    )
)]
pub(crate) struct ApiDoc;
