use bson::{oid::ObjectId, DateTime};
use tokio::sync::RwLock;

use super::{BookRepository, BookRepositoryError};
use crate::modules::books::models::{Book, BookFields};

/// Process-local repository with the same id and timestamp semantics as the
/// MongoDB one. Books are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_book(fields: BookFields) -> Book {
    let now = DateTime::now().to_time_0_3();
    Book {
        id: ObjectId::new().to_hex(),
        title: fields.title,
        author: fields.author,
        published_year: fields.published_year,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self.books.read().await.clone())
    }

    async fn create(&self, fields: BookFields) -> Result<Book, BookRepositoryError> {
        let book = new_book(fields);
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn update(
        &self,
        id: &str,
        fields: BookFields,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut books = self.books.write().await;
        let Some(book) = books.iter_mut().find(|book| book.id == id) else {
            return Ok(None);
        };

        book.title = fields.title;
        book.author = fields.author;
        book.published_year = fields.published_year;
        book.updated_at = DateTime::now().to_time_0_3();

        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, BookRepositoryError> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|book| book.id != id);
        Ok(books.len() < before)
    }

    async fn delete_all(&self) -> Result<u64, BookRepositoryError> {
        let mut books = self.books.write().await;
        let removed = books.len() as u64;
        books.clear();
        Ok(removed)
    }

    async fn insert_many(&self, books: Vec<BookFields>) -> Result<usize, BookRepositoryError> {
        let inserted: Vec<Book> = books.into_iter().map(new_book).collect();
        let count = inserted.len();
        self.books.write().await.extend(inserted);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dune() -> BookFields {
        BookFields::new("Dune", "Frank Herbert", 1965)
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let repository = InMemoryBookRepository::new();

        let book = repository.create(dune()).await.unwrap();

        assert!(ObjectId::parse_str(&book.id).is_ok());
        assert_eq!(book.title, "Dune");
        assert_eq!(book.created_at, book.updated_at);
        assert_eq!(repository.list().await.unwrap(), vec![book]);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let repository = InMemoryBookRepository::new();

        let first = repository.create(dune()).await.unwrap();
        let second = repository.create(dune()).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_refreshes_updated_at() {
        let repository = InMemoryBookRepository::new();
        let target = repository.create(dune()).await.unwrap();
        let other = repository
            .create(BookFields::new("Emma", "Jane Austen", 1815))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = repository
            .update(&target.id, BookFields::new("Dune (rev)", "Frank Herbert", 1966))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, target.id);
        assert_eq!(updated.title, "Dune (rev)");
        assert_eq!(updated.published_year, 1966);
        assert_eq!(updated.created_at, target.created_at);
        assert!(updated.updated_at > target.updated_at);
        assert_eq!(repository.list().await.unwrap(), vec![updated, other]);
    }

    #[tokio::test]
    async fn update_of_unknown_id_creates_nothing() {
        let repository = InMemoryBookRepository::new();

        let missing = repository
            .update(&ObjectId::new().to_hex(), dune())
            .await
            .unwrap();

        assert!(missing.is_none());
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let repository = InMemoryBookRepository::new();
        let book = repository.create(dune()).await.unwrap();

        assert!(repository.delete(&book.id).await.unwrap());
        assert!(!repository.delete(&book.id).await.unwrap());
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_operations_count_rows() {
        let repository = InMemoryBookRepository::new();

        let inserted = repository
            .insert_many(vec![dune(), BookFields::new("Emma", "Jane Austen", 1815)])
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(repository.delete_all().await.unwrap(), 2);
        assert_eq!(repository.delete_all().await.unwrap(), 0);
    }
}
