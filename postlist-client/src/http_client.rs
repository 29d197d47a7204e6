use reqwest::{Client, IntoUrl, Method, Url, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{PostlistClientError, PostlistClientResult};
use crate::models::{CreatedPost, Post, PostList, PostSummary};

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    title: &'a str,
    #[serde(rename = "contentHtml")]
    content_html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDto {
    id: String,
    title: String,
    content_html: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostSummaryDto {
    id: String,
    title: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostListResponseDto {
    all_posts: Option<Vec<PostSummaryDto>>,
    total_count: i64,
}

#[derive(Serialize)]
struct PageQuery {
    offset: u32,
    limit: u32,
}

impl From<PostDto> for Post {
    fn from(value: PostDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content_html: value.content_html,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<PostSummaryDto> for PostSummary {
    fn from(value: PostSummaryDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            created_at: value.created_at,
        }
    }
}

impl From<PostListResponseDto> for PostList {
    fn from(value: PostListResponseDto) -> Self {
        Self {
            posts: value
                .all_posts
                .unwrap_or_default()
                .into_iter()
                .map(PostSummary::from)
                .collect(),
            total_count: value.total_count.max(0) as u64,
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API `postlist-server`.
pub struct PostlistClient {
    base_url: String,
    client: Client,
}

impl PostlistClient {
    /// Создаёт клиент с базовым URL сервера, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> PostlistClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn post_url(&self, id: &str) -> PostlistClientResult<Url> {
        let mut url = Url::parse(&self.endpoint("/api/v1/post"))
            .map_err(|err| PostlistClientError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| PostlistClientError::InvalidUrl(self.base_url.clone()))?
            .push(id);
        Ok(url)
    }

    async fn decode_error(response: reqwest::Response) -> PostlistClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error,
            Err(_) => None,
        };
        PostlistClientError::from_http_status(status, message)
    }

    /// универсальный helper для GET-запросов с json-ответом
    async fn get_json<TQuery, TRes>(
        &self,
        url: impl IntoUrl,
        query: Option<&TQuery>,
    ) -> PostlistClientResult<TRes>
    where
        TQuery: Serialize,
        TRes: DeserializeOwned,
    {
        let mut request = self.client.request(Method::GET, url);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(PostlistClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<TRes>()
            .await
            .map_err(PostlistClientError::from_reqwest)
    }

    /// Возвращает все посты (краткие модели) и их общее количество.
    pub async fn list_all(&self) -> PostlistClientResult<PostList> {
        let dto: PostListResponseDto = self
            .get_json::<PageQuery, _>(self.endpoint("/api/v1/postlist"), None)
            .await?;
        Ok(dto.into())
    }

    /// Возвращает страницу постов (новые первыми) с пагинацией `offset/limit`.
    pub async fn list_page(&self, offset: u32, limit: u32) -> PostlistClientResult<PostList> {
        let query = PageQuery { offset, limit };
        let dto: PostListResponseDto = self
            .get_json(self.endpoint("/api/v1/posts"), Some(&query))
            .await?;
        Ok(dto.into())
    }

    /// Получает пост по идентификатору.
    ///
    /// Для неизвестного id сервер отвечает пустым массивом, поэтому результат
    /// может быть пустым.
    pub async fn get_post(&self, id: &str) -> PostlistClientResult<Vec<Post>> {
        let dtos: Option<Vec<PostDto>> = self
            .get_json::<PageQuery, _>(self.post_url(id)?, None)
            .await?;
        Ok(dtos
            .unwrap_or_default()
            .into_iter()
            .map(Post::from)
            .collect())
    }

    /// Создаёт пост и возвращает ссылку на него из заголовка `location`.
    pub async fn create_post(
        &self,
        title: &str,
        content_html: &str,
    ) -> PostlistClientResult<CreatedPost> {
        let payload = CreatePostRequestDto {
            title,
            content_html,
        };

        let response = self
            .client
            .request(Method::POST, self.endpoint("/api/v1/post"))
            .json(&payload)
            .send()
            .await
            .map_err(PostlistClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(CreatedPost { location })
    }
}
