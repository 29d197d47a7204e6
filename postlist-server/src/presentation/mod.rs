use std::sync::Arc;

use crate::application::post_service::PostService;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) post_service: Arc<PostService>,
    pub(crate) front_url: Arc<str>,
}

impl AppState {
    pub(crate) fn new(post_service: Arc<PostService>, front_url: impl Into<Arc<str>>) -> Self {
        Self {
            post_service,
            front_url: front_url.into(),
        }
    }
}
