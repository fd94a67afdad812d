//! HTTP handlers for the `/books` resource.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use bookstore_http::error::AppError;
use serde_json::json;

use super::models::{Book, BookFields, NewBook};
use super::repository::{BookRepositoryError, SharedRepository};

impl From<BookRepositoryError> for AppError {
    fn from(err: BookRepositoryError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// Routes relative to the module mount point.
pub fn router(repository: SharedRepository) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", put(update_book).delete(delete_book))
        .with_state(repository)
}

fn validated(payload: Result<Json<NewBook>, JsonRejection>) -> Result<BookFields, AppError> {
    let Json(payload) = payload?;

    payload.validate().map_err(|errors| {
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        let details = errors
            .iter()
            .map(|e| json!({ "field": e.field, "error": e.error }))
            .collect();
        AppError::validation(
            details,
            format!("Book validation failed: {}", fields.join(", ")),
        )
    })
}

async fn list_books(State(repository): State<SharedRepository>) -> Result<Json<Vec<Book>>, AppError> {
    let books = repository.list().await?;
    Ok(Json(books))
}

async fn create_book(
    State(repository): State<SharedRepository>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let fields = validated(payload)?;
    let book = repository.create(fields).await?;

    tracing::info!(book_id = %book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let fields = validated(payload)?;

    match repository.update(&id, fields).await? {
        Some(book) => {
            tracing::info!(book_id = %book.id, "book updated");
            Ok(Json(book))
        }
        None => Err(AppError::not_found(format!("Book {} not found", id))),
    }
}

/// Absent ids are not an error; the outcome is the same either way.
async fn delete_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = repository.delete(&id).await?;

    tracing::info!(book_id = %id, removed, "book delete requested");
    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
