use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::AppState;
use crate::presentation::http::middleware::cors::apply_cors;
use crate::presentation::http::middleware::limits::apply_limits;
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::http::openapi::ApiDoc;
use crate::presentation::http::routes;

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_app(settings, state)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

pub(crate) fn build_app(settings: &Settings, state: AppState) -> anyhow::Result<Router> {
    let app = build_router(state);
    let app = apply_trace(app);
    let app = apply_limits(app, settings);
    apply_cors(app, settings)
}

pub(crate) fn build_router(state: AppState) -> Router {
    routes::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::application::post_service::PostService;
    use crate::data::post_repository::PostRepository;
    use crate::data::repositories::memory::post_repository::InMemoryPostRepository;
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatedPost, PageWindow, Post, PostInput, PostSummary};
    use crate::infrastructure::settings::Settings;

    const FRONT_URL: &str = "http://front.test";

    fn test_settings() -> Settings {
        Settings::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "FRONT_URL" => Some(FRONT_URL.to_string()),
            "PER_PAGE" => Some("10".to_string()),
            "HTTP_REQUEST_BODY_LIMIT_BYTES" => Some("1024".to_string()),
            "HTTP_REQUEST_TIMEOUT_SECS" => Some("1".to_string()),
            _ => None,
        })
        .expect("test settings must parse")
    }

    fn app_with(repo: Arc<dyn PostRepository>) -> Router {
        let settings = test_settings();
        let service = Arc::new(PostService::new(repo, settings.per_page));
        build_app(&settings, AppState::new(service, settings.front_url.clone()))
            .expect("app must build")
    }

    fn memory_app() -> (Router, Arc<InMemoryPostRepository>) {
        let repo = Arc::new(InMemoryPostRepository::new());
        (app_with(repo.clone()), repo)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    async fn get(app: &Router, uri: &str) -> Response {
        send(
            app,
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }

    async fn post_json(app: &Router, body: &str) -> Response {
        send(
            app,
            Request::builder()
                .method("POST")
                .uri("/api/v1/post")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        serde_json::from_slice(&bytes).expect("body must be json")
    }

    async fn seed(repo: &InMemoryPostRepository, count: usize) {
        for i in 0..count {
            repo.insert_one(PostInput {
                title: format!("post {i}"),
                content: format!("<p>{i}</p>"),
            })
            .await
            .expect("seed insert must succeed");
        }
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (app, _) = memory_app();
        let response = get(&app, "/healthz").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn create_then_get_by_location_id() {
        let (app, _) = memory_app();

        let response = post_json(&app, r#"{"title":"A","contentHtml":"<p>x</p>"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("location header must be set")
            .to_string();
        let id = location
            .strip_prefix(&format!("{FRONT_URL}/posts/"))
            .expect("location must point at the front end");
        assert!(id.parse::<i64>().is_ok());

        let body = json_body(response).await;
        assert_eq!(body["status"], "200");
        assert_eq!(body["data"], "success");

        let response = get(&app, &format!("/api/v1/post/{id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let posts = json_body(response).await;
        let posts = posts.as_array().expect("array body");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "A");
        assert_eq!(posts[0]["contentHtml"], "<p>x</p>");
        assert_eq!(posts[0]["id"], id);
    }

    #[tokio::test]
    async fn unknown_id_returns_empty_array() {
        let (app, repo) = memory_app();
        seed(&repo, 2).await;

        for uri in ["/api/v1/post/999", "/api/v1/post/not-a-number"] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await, serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_without_insert() {
        let (app, repo) = memory_app();

        for body in [
            "{not json",
            r#"{"title": 5, "contentHtml": "x"}"#,
            r#"{"title": "only title"}"#,
        ] {
            let response = post_json(&app, body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let error = json_body(response).await;
            assert!(error["error"].as_str().is_some_and(|msg| !msg.is_empty()));
        }

        assert_eq!(repo.count_all().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let (app, repo) = memory_app();
        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/v1/post")
                .body(Body::from(r#"{"title":"A","contentHtml":"x"}"#))
                .expect("valid request"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(repo.count_all().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let (app, repo) = memory_app();
        let body = format!(r#"{{"title":"A","contentHtml":"{}"}}"#, "x".repeat(4096));

        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/v1/post")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .expect("valid request"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"], "payload too large");
        assert_eq!(repo.count_all().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn oversized_body_without_length_header_is_rejected() {
        let (app, repo) = memory_app();
        let body = format!(r#"{{"title":"A","contentHtml":"{}"}}"#, "x".repeat(4096));

        let response = post_json(&app, &body).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"], "payload too large");
        assert_eq!(repo.count_all().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn posts_without_params_uses_configured_page_size() {
        let (app, repo) = memory_app();
        seed(&repo, 25).await;

        let response = get(&app, "/api/v1/posts").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["totalCount"], 25);
        let posts = body["allPosts"].as_array().expect("array");
        assert_eq!(posts.len(), 10);
        assert_eq!(posts[0]["title"], "post 24");
    }

    #[tokio::test]
    async fn consecutive_pages_do_not_overlap() {
        let (app, repo) = memory_app();
        seed(&repo, 9).await;

        let first = json_body(get(&app, "/api/v1/posts?offset=0&limit=4").await).await;
        let second = json_body(get(&app, "/api/v1/posts?offset=4&limit=4").await).await;

        let ids = |body: &Value| -> Vec<String> {
            body["allPosts"]
                .as_array()
                .expect("array")
                .iter()
                .map(|post| post["id"].as_str().expect("string id").to_string())
                .collect()
        };
        let first_ids = ids(&first);
        let second_ids = ids(&second);

        assert_eq!(first_ids, vec!["9", "8", "7", "6"]);
        assert_eq!(second_ids, vec!["5", "4", "3", "2"]);
        assert_eq!(first["totalCount"], 9);
        assert_eq!(second["totalCount"], 9);
    }

    #[tokio::test]
    async fn blank_params_fall_back_to_defaults() {
        let (app, repo) = memory_app();
        seed(&repo, 12).await;

        let body = json_body(get(&app, "/api/v1/posts?offset=&limit=").await).await;
        assert_eq!(body["allPosts"].as_array().expect("array").len(), 10);

        let body = json_body(get(&app, "/api/v1/posts?offset=10").await).await;
        assert_eq!(body["allPosts"].as_array().expect("array").len(), 2);
    }

    #[tokio::test]
    async fn invalid_window_is_bad_request() {
        let (app, _) = memory_app();

        for uri in [
            "/api/v1/posts?offset=-1",
            "/api/v1/posts?limit=0",
            "/api/v1/posts?limit=101",
            "/api/v1/posts?limit=abc",
            "/api/v1/posts?offset=1.5",
        ] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn postlist_returns_every_post_and_count() {
        let (app, repo) = memory_app();
        seed(&repo, 12).await;

        let body = json_body(get(&app, "/api/v1/postlist").await).await;
        assert_eq!(body["totalCount"], 12);
        let posts = body["allPosts"].as_array().expect("array");
        assert_eq!(posts.len(), 12);
        assert!(posts[0].get("createdAt").is_some());
        assert!(posts[0].get("contentHtml").is_none());
    }

    struct FailingRepo;

    #[async_trait]
    impl PostRepository for FailingRepo {
        async fn fetch_all(&self) -> Result<Vec<PostSummary>, DomainError> {
            Err(DomainError::Storage("fetch_all: connection refused".to_string()))
        }

        async fn fetch_by_id(&self, id: &str) -> Result<Vec<Post>, DomainError> {
            Err(DomainError::mapping(
                format!("fetch_by_id {id:?}"),
                "column count mismatch",
            ))
        }

        async fn fetch_page(&self, _window: PageWindow) -> Result<Vec<PostSummary>, DomainError> {
            Err(DomainError::Storage("fetch_page: connection refused".to_string()))
        }

        async fn insert_one(&self, _input: PostInput) -> Result<CreatedPost, DomainError> {
            Err(DomainError::Storage("insert_one: connection refused".to_string()))
        }

        async fn count_all(&self) -> Result<i64, DomainError> {
            Err(DomainError::Storage("count_all: connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn storage_failures_become_500_and_server_keeps_serving() {
        let app = app_with(Arc::new(FailingRepo));

        for response in [
            get(&app, "/api/v1/postlist").await,
            get(&app, "/api/v1/posts").await,
            get(&app, "/api/v1/post/1").await,
            post_json(&app, r#"{"title":"A","contentHtml":"x"}"#).await,
        ] {
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json_body(response).await["error"], "internal error");
        }

        assert_eq!(get(&app, "/healthz").await.status(), StatusCode::OK);
    }

    struct HangingRepo;

    #[async_trait]
    impl PostRepository for HangingRepo {
        async fn fetch_all(&self) -> Result<Vec<PostSummary>, DomainError> {
            std::future::pending().await
        }

        async fn fetch_by_id(&self, _id: &str) -> Result<Vec<Post>, DomainError> {
            std::future::pending().await
        }

        async fn fetch_page(&self, _window: PageWindow) -> Result<Vec<PostSummary>, DomainError> {
            std::future::pending().await
        }

        async fn insert_one(&self, _input: PostInput) -> Result<CreatedPost, DomainError> {
            std::future::pending().await
        }

        async fn count_all(&self) -> Result<i64, DomainError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn slow_request_times_out_with_error_body() {
        let app = app_with(Arc::new(HangingRepo));

        let response = get(&app, "/api/v1/postlist").await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(json_body(response).await["error"], "request timed out");

        assert_eq!(get(&app, "/healthz").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_configured_front_url() {
        let (app, _) = memory_app();
        let response = send(
            &app,
            Request::builder()
                .uri("/api/v1/postlist")
                .header(header::ORIGIN, FRONT_URL)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await;

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some(FRONT_URL)
        );
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (app, _) = memory_app();
        let response = get(&app, "/api-docs/openapi.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"].get("/api/v1/posts").is_some());
    }
}
