use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use postlist_client::{Post, PostList, PostlistClient, PostlistClientError};

const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "postlist-cli", version, about = "CLI клиент для postlist-server")]
struct Cli {
    /// Адрес сервера. По умолчанию берётся из POSTLIST_HTTP_URL или http://127.0.0.1:8080.
    #[arg(long, global = true, env = "POSTLIST_HTTP_URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Все посты и их общее количество.
    All,
    /// Страница постов, новые первыми.
    List {
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        /// HTML-содержимое поста.
        #[arg(long)]
        content: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let client = PostlistClient::new(resolve_server(cli.server)).map_err(map_client_error)?;

    match cli.command {
        Command::All => {
            let list = client.list_all().await.map_err(map_client_error)?;
            print_list(&list);
        }
        Command::List { offset, limit } => {
            let list = client
                .list_page(offset, limit)
                .await
                .map_err(map_client_error)?;
            print_list(&list);
        }
        Command::Get { id } => {
            let posts = client.get_post(&id).await.map_err(map_client_error)?;
            match posts.first() {
                Some(post) => print_post("Пост", post),
                None => println!("Пост не найден: id={id}"),
            }
        }
        Command::Create { title, content } => {
            let created = client
                .create_post(&title, &content)
                .await
                .map_err(map_client_error)?;
            println!("Пост создан");
            if let Some(location) = &created.location {
                println!("location: {location}");
            }
        }
    }

    Ok(())
}

fn resolve_server(server: Option<String>) -> String {
    normalize_server(server.unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string()))
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn map_client_error(err: PostlistClientError) -> anyhow::Error {
    let message = match err {
        PostlistClientError::NotFound => "ресурс не найден".to_string(),
        PostlistClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        PostlistClientError::Server(message) => format!("ошибка сервера: {message}"),
        PostlistClientError::Http(err) => format!("ошибка HTTP: {err}"),
        PostlistClientError::InvalidUrl(message) => format!("некорректный адрес сервера: {message}"),
    };
    anyhow::anyhow!(message)
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("contentHtml: {}", post.content_html);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
}

fn print_list(list: &PostList) {
    println!(
        "Постов: {} (total={})",
        list.posts.len(),
        list.total_count
    );

    for post in &list.posts {
        println!("- [{}] {} ({})", post.id, post.title, post.created_at);
    }
}
