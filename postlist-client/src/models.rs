use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Полная модель поста.
pub struct Post {
    /// Идентификатор поста (строка).
    pub id: String,
    /// Заголовок поста.
    pub title: String,
    /// HTML-содержимое поста.
    pub content_html: String,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Краткая модель поста для списков.
pub struct PostSummary {
    /// Идентификатор поста (строка).
    pub id: String,
    /// Заголовок поста.
    pub title: String,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Список постов вместе с общим количеством постов.
pub struct PostList {
    /// Посты текущей выборки.
    pub posts: Vec<PostSummary>,
    /// Общее количество постов независимо от окна выборки.
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Результат создания поста.
pub struct CreatedPost {
    /// Значение заголовка `location`, указывающее на новый пост.
    pub location: Option<String>,
}

impl CreatedPost {
    /// Возвращает id нового поста, извлечённый из `location`.
    pub fn id(&self) -> Option<&str> {
        self.location
            .as_deref()
            .and_then(|location| location.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}
