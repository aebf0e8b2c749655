//! JSON HTTP API over the query engine and favorites.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/status` | Corpus load status |
//! | `GET`  | `/stats` | Book, chapter and verse counts |
//! | `GET`  | `/reference?q=` | Resolve a reference |
//! | `GET`  | `/search?q=` | Keyword or phrase search |
//! | `GET`  | `/content?q=` | Reference, falling back to search |
//! | `GET`  | `/random` | Random verse |
//! | `GET`  | `/popular/{index}` | Popular verse by index |
//! | `GET`  | `/daily` | Popular verse of the day |
//! | `GET`  | `/favorites` | All favorites, newest first |
//! | `GET`  | `/favorites/by-book` | Favorites grouped by book |
//! | `GET`  | `/favorites/check?book=&chapter=&verse=` | Is this verse saved |
//! | `POST` | `/favorites` | Save a verse |
//! | `DELETE` | `/favorites/{id}` | Remove a favorite |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "BOOK_NOT_FOUND", "message": "BOOK_NOT_FOUND" } }
//! ```
//!
//! 400 for `INVALID_FORMAT` and `EMPTY_SEARCH`, 404 for the `*_NOT_FOUND`
//! codes and `NO_RESULTS`, 503 for `CORPUS_UNAVAILABLE`, 500 for
//! `INVALID_CORPUS` and `STORAGE_ERROR`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser UI can call
//! the API directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use offline_bible_core::models::{CorpusStats, Favorite, LoadStatus, NewFavorite, SearchResult};
use offline_bible_core::BibleError;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::app::App;

type AppState = Arc<App>;

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(app: Arc<App>) -> anyhow::Result<()> {
    let bind_addr = app.config.server.bind.clone();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(bind = %bind_addr, "HTTP server listening");
    println!("Bible server listening on http://{}", bind_addr);
    serve(listener, app).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, app: Arc<App>) -> anyhow::Result<()> {
    axum::serve(listener, router(app)).await?;
    Ok(())
}

pub fn router(app: Arc<App>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/stats", get(handle_stats))
        .route("/reference", get(handle_reference))
        .route("/search", get(handle_search))
        .route("/content", get(handle_content))
        .route("/random", get(handle_random))
        .route("/popular/{index}", get(handle_popular))
        .route("/daily", get(handle_daily))
        .route(
            "/favorites",
            get(handle_list_favorites).post(handle_add_favorite),
        )
        .route("/favorites/by-book", get(handle_favorites_by_book))
        .route("/favorites/check", get(handle_check_favorite))
        .route("/favorites/{id}", delete(handle_remove_favorite))
        .layer(cors)
        .with_state(app)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<BibleError> for AppError {
    fn from(err: BibleError) -> Self {
        let status = match &err {
            BibleError::InvalidFormat | BibleError::EmptySearch => StatusCode::BAD_REQUEST,
            BibleError::BookNotFound
            | BibleError::ChapterNotFound
            | BibleError::VerseNotFound
            | BibleError::NoResults => StatusCode::NOT_FOUND,
            BibleError::CorpusUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            BibleError::InvalidCorpus(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "Storage operation failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "STORAGE_ERROR".to_string(),
            message: format!("{:#}", err),
        }
    }
}

// ============ Corpus ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_status(State(app): State<AppState>) -> Json<LoadStatus> {
    Json(app.engine.load_status())
}

async fn handle_stats(State(app): State<AppState>) -> Result<Json<CorpusStats>, AppError> {
    Ok(Json(app.engine.stats().await?))
}

#[derive(Deserialize)]
struct TextQuery {
    #[serde(default)]
    q: String,
}

async fn handle_reference(
    State(app): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(app.engine.resolve_reference(&query.q).await?))
}

async fn handle_search(
    State(app): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(app.engine.search(&query.q).await?))
}

async fn handle_content(
    State(app): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(app.engine.book_content(&query.q).await?))
}

async fn handle_random(State(app): State<AppState>) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(app.engine.random_verse().await?))
}

async fn handle_popular(
    State(app): State<AppState>,
    Path(index): Path<i64>,
) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(app.engine.popular_verse(index).await?))
}

async fn handle_daily(State(app): State<AppState>) -> Result<Json<SearchResult>, AppError> {
    Ok(Json(app.engine.daily_verse().await?))
}

// ============ Favorites ============

async fn handle_list_favorites(
    State(app): State<AppState>,
) -> Result<Json<Vec<Favorite>>, AppError> {
    Ok(Json(app.favorites.all().await?))
}

async fn handle_favorites_by_book(
    State(app): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<Favorite>>>, AppError> {
    Ok(Json(app.favorites.by_book().await?))
}

#[derive(Deserialize)]
struct CheckQuery {
    book: String,
    chapter: u32,
    verse: u32,
}

#[derive(Serialize)]
struct CheckResponse {
    id: String,
    favorite: bool,
}

async fn handle_check_favorite(
    State(app): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    let favorite = app
        .favorites
        .is_favorite(&query.book, query.chapter, query.verse)
        .await?;
    Ok(Json(CheckResponse {
        id: offline_bible_core::models::favorite_id(&query.book, query.chapter, query.verse),
        favorite,
    }))
}

async fn handle_add_favorite(
    State(app): State<AppState>,
    Json(new): Json<NewFavorite>,
) -> Result<(StatusCode, Json<Favorite>), AppError> {
    let favorite = app.favorites.add(new).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn handle_remove_favorite(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    app.favorites.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
