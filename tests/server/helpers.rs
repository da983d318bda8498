use std::sync::Arc;

use inkwell::application::routes::app_router;
use inkwell::application::state::{AppState, AppStateConfig, DEFAULT_AUTH_RATE_LIMIT_PER_MINUTE};
use inkwell::domain::books::{BookSummary, NewBook};
use inkwell::domain::chapters::{Chapter, NewChapter};
use inkwell::domain::repositories::{BookRepository, ChapterRepository};
use inkwell::domain::tokens::LoginResponse;
use inkwell::infrastructure::auth::JwtKeys;
use inkwell::infrastructure::database::{Database, DatabasePool};
use reqwest::Client;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::AbortHandle;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "secret123";

pub struct TestApp {
    pub address: String,
    pub pool: DatabasePool,
    pub book_repo: Arc<dyn BookRepository>,
    pub chapter_repo: Arc<dyn ChapterRepository>,
    pub client: Client,
    server_handle: AbortHandle,
    _data_dir: Option<TempDir>,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_config(test_config()).await
}

pub async fn spawn_app_with_config(config: AppStateConfig) -> TestApp {
    spawn_app_on("sqlite::memory:", config, None).await
}

/// Like [`spawn_app`], but backed by a WAL database file with a real
/// connection pool, so concurrent requests hit SQLite in parallel.
pub async fn spawn_app_on_disk() -> TestApp {
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", data_dir.path().join("inkwell.db").display());
    spawn_app_on(&url, test_config(), Some(data_dir)).await
}

fn test_config() -> AppStateConfig {
    AppStateConfig {
        jwt_keys: JwtKeys::with_default_ttls(TEST_SECRET),
        auth_rate_limit_per_minute: DEFAULT_AUTH_RATE_LIMIT_PER_MINUTE * 100,
    }
}

async fn spawn_app_on(url: &str, config: AppStateConfig, data_dir: Option<TempDir>) -> TestApp {
    let database = Database::connect(url)
        .await
        .expect("Failed to connect to test database");
    let pool = database.clone_pool();
    let state = AppState::from_database(&database, config);

    let book_repo = state.book_repo.clone();
    let chapter_repo = state.chapter_repo.clone();

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        pool,
        book_repo,
        chapter_repo,
        client: Client::new(),
        server_handle,
        _data_dir: data_dir,
    }
}

/// Register `username` through the API and log in, returning the token pair.
pub async fn register_and_login(app: &TestApp, username: &str) -> LoginResponse {
    let response = app
        .client
        .post(app.api_url("/users/register"))
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status(), 200, "registration of {username} failed");

    let response = app
        .client
        .post(app.api_url("/auth/login"))
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(response.status(), 200, "login of {username} failed");

    response.json().await.expect("Failed to parse login response")
}

pub fn new_book(title: &str, author: &str, category: Option<&str>) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        cover: None,
        description: format!("{title} by {author}"),
        category: category.map(String::from),
        tags: vec!["测试".to_string()],
        word_count: None,
        status: Default::default(),
        rating: 0.0,
        author_user_id: None,
        published_at: None,
    }
}

/// Insert a book with `chapters` numbered chapters straight into the database.
pub async fn seed_book(
    app: &TestApp,
    title: &str,
    category: Option<&str>,
    chapters: usize,
) -> (BookSummary, Vec<Chapter>) {
    let book = app
        .book_repo
        .insert(new_book(title, "Author", category))
        .await
        .expect("Failed to seed book");

    let mut stored = Vec::with_capacity(chapters);
    for n in 1..=chapters {
        let chapter = app
            .chapter_repo
            .insert(
                book.id,
                NewChapter {
                    title: format!("第{n}章"),
                    content: format!("Chapter {n} of {title}"),
                    order_num: n as i64,
                    word_count: None,
                    is_vip: false,
                },
            )
            .await
            .expect("Failed to seed chapter");
        stored.push(chapter);
    }

    let book = app.book_repo.get(book.id).await.expect("Failed to reload book");
    (book, stored)
}

pub async fn get_json(app: &TestApp, path: &str, token: Option<&str>) -> (u16, Value) {
    let mut request = app.client.get(app.api_url(path));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await.expect("Failed to execute request");
    let status = response.status().as_u16();
    let body = response.json().await.expect("Failed to parse response");
    (status, body)
}

pub async fn send_json(
    app: &TestApp,
    method: reqwest::Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut request = app.client.request(method, app.api_url(path));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.expect("Failed to execute request");
    let status = response.status().as_u16();
    let body = response.json().await.expect("Failed to parse response");
    (status, body)
}
