//! Клиентская библиотека для работы с postlist-server по HTTP.
//!
//! Покрывает все публичные эндпоинты `/api/v1`: полный список постов,
//! постраничный список, получение поста по id и создание поста.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{PostlistClientError, PostlistClientResult};
pub use http_client::PostlistClient;
pub use models::{CreatedPost, Post, PostList, PostSummary};
