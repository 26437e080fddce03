//! HTTP handlers for `/api/v1/book`.

use anyhow::anyhow;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{post, put},
    Router,
};
use bookshelf_db::PageRequest;
use bookshelf_http::{
    error::AppError,
    extract::{Json, Path, Query},
};
use serde::Deserialize;

use super::models::BookRecord;
use super::repository::RepositoryError;
use super::service::BookService;

/// Where the books routes are mounted
pub const BOOKS_PATH: &str = "/api/v1/book";

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Internal(err.into())
    }
}

/// Query parameters of the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "ListParams::default_size")]
    pub size: u64,
    #[serde(default)]
    pub pattern: String,
}

impl ListParams {
    fn default_size() -> u64 {
        PageRequest::DEFAULT_SIZE
    }
}

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", post(create_book).get(list_books))
        .route("/{id}", put(update_book).delete(delete_book))
        .with_state(service)
}

async fn create_book(
    State(service): State<BookService>,
    Json(mut record): Json<BookRecord>,
) -> Result<impl IntoResponse, AppError> {
    record.id = None;
    let saved = service.save(record).await?;

    let id = saved
        .id
        .as_deref()
        .ok_or_else(|| anyhow!("store returned a book without an id"))?;
    let location = format!("{}/{}", BOOKS_PATH, id);
    tracing::info!(book_id = %id, "book created");

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(saved)))
}

async fn list_books(
    State(service): State<BookService>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.size)
        .ok_or_else(|| AppError::bad_request("size must be greater than zero"))?;
    // Stores address records with a signed 64-bit offset.
    if i64::try_from(page.number.saturating_mul(page.size)).is_err() {
        return Err(AppError::bad_request(format!(
            "page {} is out of range for size {}",
            page.number, page.size
        )));
    }

    let books = service.get_paginated(page, &params.pattern).await?;
    Ok(Json(books))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    Json(mut record): Json<BookRecord>,
) -> Result<StatusCode, AppError> {
    if service.find_by_id(&id).await?.is_none() {
        return Err(AppError::not_found(format!("book '{}' not found", id)));
    }

    record.id = Some(id);
    service.save(record).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete(&id).await?;
    tracing::info!(book_id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::{
        BookRepository, InMemoryBookRepository, RepositoryResult,
    };
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response},
    };
    use bookshelf_db::Page;
    use serde_json::{json, Value};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;

    /// In-memory store that counts writes
    #[derive(Default)]
    struct CountingRepository {
        inner: InMemoryBookRepository,
        saves: AtomicUsize,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl BookRepository for CountingRepository {
        async fn save(&self, record: BookRecord) -> RepositoryResult<BookRecord> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(record).await
        }

        async fn get_by_text_pattern(
            &self,
            page: PageRequest,
            pattern: &str,
        ) -> RepositoryResult<Page<BookRecord>> {
            self.inner.get_by_text_pattern(page, pattern).await
        }

        async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<BookRecord>> {
            self.inner.find_by_id(id).await
        }

        async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_by_id(id).await
        }
    }

    /// Store whose backend is always unreachable
    struct FailingRepository;

    fn store_down() -> RepositoryError {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        RepositoryError::Backend(mongodb::error::Error::from(io))
    }

    #[async_trait]
    impl BookRepository for FailingRepository {
        async fn save(&self, _record: BookRecord) -> RepositoryResult<BookRecord> {
            Err(store_down())
        }

        async fn get_by_text_pattern(
            &self,
            _page: PageRequest,
            _pattern: &str,
        ) -> RepositoryResult<Page<BookRecord>> {
            Err(store_down())
        }

        async fn find_by_id(&self, _id: &str) -> RepositoryResult<Option<BookRecord>> {
            Err(store_down())
        }

        async fn delete_by_id(&self, _id: &str) -> RepositoryResult<()> {
            Err(store_down())
        }
    }

    fn app() -> (Router, Arc<CountingRepository>) {
        let repository = Arc::new(CountingRepository::default());
        let app = Router::new().nest(BOOKS_PATH, router(BookService::new(repository.clone())));
        (app, repository)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seed(repository: &CountingRepository, count: usize) {
        for i in 0..count {
            repository
                .inner
                .save(BookRecord {
                    name: Some(format!("Book {i}")),
                    ..BookRecord::default()
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn create_returns_created_with_location() {
        let (app, repository) = app();

        let response = app
            .oneshot(json_request(
                "POST",
                BOOKS_PATH,
                json!({"name": "X", "quantity": 1, "authors": ["A"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();

        let body = body_json(response).await;
        let id = body["id"].as_str().unwrap();
        assert_eq!(location, format!("/api/v1/book/{id}"));
        assert_eq!(body["name"], "X");
        assert_eq!(body["quantity"], 1);
        assert_eq!(body["authors"], json!(["A"]));

        let stored = repository.inner.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn create_ignores_client_supplied_id() {
        let (app, _) = app();

        let response = app
            .oneshot(json_request(
                "POST",
                BOOKS_PATH,
                json!({"id": "chosen-by-client", "name": "X"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_ne!(body["id"], "chosen-by-client");
    }

    #[tokio::test]
    async fn create_accepts_null_authors() {
        let (app, repository) = app();

        let response = app
            .oneshot(json_request(
                "POST",
                BOOKS_PATH,
                json!({"name": "X", "authors": null}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["authors"], json!([]));
        assert_eq!(repository.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_with_malformed_json_is_bad_request() {
        let (app, repository) = app();

        let response = app
            .oneshot(
                Request::post(BOOKS_PATH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"name\": \"X\""))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "bad_request");
        assert_eq!(repository.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn list_uses_default_page_and_size() {
        let (app, repository) = app();
        seed(&repository, 41).await;

        let response = app.oneshot(empty_request("GET", BOOKS_PATH)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["content"].as_array().unwrap().len(), 20);
        assert_eq!(body["page"]["size"], 20);
        assert_eq!(body["page"]["number"], 0);
        assert_eq!(body["page"]["totalElements"], 41);
        assert_eq!(body["page"]["totalPages"], 3);
    }

    #[tokio::test]
    async fn list_returns_requested_page() {
        let (app, repository) = app();
        seed(&repository, 41).await;

        let response = app
            .oneshot(empty_request("GET", "/api/v1/book?page=2&size=20"))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["content"].as_array().unwrap().len(), 1);
        assert_eq!(body["page"]["number"], 2);
        assert_eq!(body["page"]["totalPages"], 3);
    }

    #[tokio::test]
    async fn list_exact_multiple_has_no_trailing_page() {
        let (app, repository) = app();
        seed(&repository, 40).await;

        let response = app
            .oneshot(empty_request("GET", "/api/v1/book?size=20"))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["page"]["totalElements"], 40);
        assert_eq!(body["page"]["totalPages"], 2);
    }

    #[tokio::test]
    async fn list_filters_by_pattern() {
        let (app, repository) = app();
        seed(&repository, 12).await;

        let response = app
            .oneshot(empty_request("GET", "/api/v1/book?pattern=book%201"))
            .await
            .unwrap();

        let body = body_json(response).await;
        // "Book 1", "Book 10", "Book 11"
        assert_eq!(body["page"]["totalElements"], 3);
    }

    #[tokio::test]
    async fn list_with_zero_size_is_bad_request() {
        let (app, _) = app();

        let response = app
            .oneshot(empty_request("GET", "/api/v1/book?size=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_with_page_beyond_addressable_range_is_bad_request() {
        let (app, _) = app();

        let response = app
            .oneshot(empty_request(
                "GET",
                "/api/v1/book?page=18446744073709551615&size=20",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn list_with_unparsable_page_is_bad_request() {
        let (app, _) = app();

        let response = app
            .oneshot(empty_request("GET", "/api/v1/book?page=first"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_existing_book_replaces_fields() {
        let (app, repository) = app();
        let saved = repository
            .inner
            .save(BookRecord {
                name: Some("Old".to_string()),
                year: Some(1990),
                ..BookRecord::default()
            })
            .await
            .unwrap();
        let id = saved.id.unwrap();

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/v1/book/{id}"),
                json!({"id": "ignored", "name": "New", "authors": ["B"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let stored = repository.inner.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.id.as_deref(), Some(id.as_str()));
        assert_eq!(stored.name.as_deref(), Some("New"));
        assert_eq!(stored.authors, vec!["B"]);
        assert_eq!(stored.year, None);
        assert!(repository.inner.find_by_id("ignored").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found_without_write() {
        let (app, repository) = app();

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/v1/book/99999999",
                json!({"name": "Ghost"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "not_found");
        assert_eq!(repository.saves.load(Ordering::SeqCst), 0);
        assert!(repository.inner.is_empty().await);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (app, repository) = app();
        let saved = repository.inner.save(BookRecord::default()).await.unwrap();
        let uri = format!("/api/v1/book/{}", saved.id.unwrap());

        let first = app
            .clone()
            .oneshot(empty_request("DELETE", &uri))
            .await
            .unwrap();
        let second = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();

        assert_eq!(first.status(), StatusCode::NO_CONTENT);
        assert_eq!(second.status(), StatusCode::NO_CONTENT);
        assert_eq!(repository.deletes.load(Ordering::SeqCst), 2);
        assert!(repository.inner.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() {
        let app = Router::new().nest(
            BOOKS_PATH,
            router(BookService::new(Arc::new(FailingRepository))),
        );

        let response = app.oneshot(empty_request("GET", BOOKS_PATH)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "internal_error");
    }
}
