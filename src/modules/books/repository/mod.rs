//! Storage abstraction for books.
//!
//! Handlers only see [`BookRepository`]; the process wires in
//! [`MongoBookRepository`] at start-up while tests use
//! [`InMemoryBookRepository`].

use std::sync::Arc;

use super::models::{Book, BookFields};

mod in_memory;
mod mongo;

pub use in_memory::InMemoryBookRepository;
pub use mongo::MongoBookRepository;

/// Repository handle shared by every request handler
pub type SharedRepository = Arc<dyn BookRepository>;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("database failure: {0}")]
    Database(#[from] mongodb::error::Error),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// All books in storage order
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError>;

    /// Persists a new book, assigning its id and both timestamps
    async fn create(&self, fields: BookFields) -> Result<Book, BookRepositoryError>;

    /// Replaces the writable fields and refreshes `updated_at`.
    /// Returns `None` when no book has this id.
    async fn update(&self, id: &str, fields: BookFields)
        -> Result<Option<Book>, BookRepositoryError>;

    /// Returns whether a book was actually removed
    async fn delete(&self, id: &str) -> Result<bool, BookRepositoryError>;

    /// Removes every book, returning how many were deleted
    async fn delete_all(&self) -> Result<u64, BookRepositoryError>;

    /// Bulk insert, returning how many books were stored
    async fn insert_many(&self, books: Vec<BookFields>) -> Result<usize, BookRepositoryError>;
}
