//! Fixed sample catalog used to reset a development database.

use super::models::BookFields;
use super::repository::{BookRepository, BookRepositoryError};

const SAMPLE_BOOKS: [(&str, &str, i32); 4] = [
    ("The Great Gatsby", "F. Scott Fitzgerald", 1925),
    ("To Kill a Mockingbird", "Harper Lee", 1960),
    ("1984", "George Orwell", 1949),
    ("Pride and Prejudice", "Jane Austen", 1813),
];

pub fn sample_books() -> Vec<BookFields> {
    SAMPLE_BOOKS
        .iter()
        .map(|&(title, author, year)| BookFields::new(title, author, year))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub cleared: u64,
    pub inserted: usize,
}

/// Delete every book, then insert the sample catalog.
pub async fn seed_books(
    repository: &dyn BookRepository,
) -> Result<SeedReport, BookRepositoryError> {
    let cleared = repository.delete_all().await?;
    tracing::info!(count = cleared, "cleared existing books");

    let inserted = repository.insert_many(sample_books()).await?;
    tracing::info!(count = inserted, "inserted sample books");

    Ok(SeedReport { cleared, inserted })
}
