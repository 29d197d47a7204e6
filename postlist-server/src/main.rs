use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::post_service::PostService;
use data::post_repository::PostRepository;
use data::repositories::memory::post_repository::InMemoryPostRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use infrastructure::database::create_pool;
use infrastructure::logging::init_logging;
use infrastructure::settings::{Settings, StorageBackend};
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let repo: Arc<dyn PostRepository> = match settings.storage_backend {
        StorageBackend::Postgres => {
            let database_url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(database_url, settings.database_max_connections).await?;
            info!("Connected!");
            Arc::new(PostgresPostRepository::new(pool))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, posts are lost on restart");
            Arc::new(InMemoryPostRepository::new())
        }
    };

    let post_service = Arc::new(PostService::new(repo, settings.per_page));
    let state = AppState::new(post_service, settings.front_url.clone());

    server::run_http(&settings, state).await
}
