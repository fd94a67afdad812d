use bson::{doc, oid::ObjectId, DateTime};
use futures_util::TryStreamExt;
use mongodb::{options::ReturnDocument, Collection, Database};
use serde::{Deserialize, Serialize};

use super::{BookRepository, BookRepositoryError};
use crate::modules::books::models::{Book, BookFields};

/// Stored shape of a book document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    author: String,
    published_year: i32,
    created_at: DateTime,
    updated_at: DateTime,
}

impl BookDocument {
    fn new(fields: BookFields, now: DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            title: fields.title,
            author: fields.author,
            published_year: fields.published_year,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: document.id.to_hex(),
            title: document.title,
            author: document.author,
            published_year: document.published_year,
            created_at: document.created_at.to_time_0_3(),
            updated_at: document.updated_at.to_time_0_3(),
        }
    }
}

/// MongoDB-backed repository over a single collection.
#[derive(Clone, Debug)]
pub struct MongoBookRepository {
    collection: Collection<BookDocument>,
}

impl MongoBookRepository {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for MongoBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let documents: Vec<BookDocument> = self.collection.find(doc! {}).await?.try_collect().await?;
        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn create(&self, fields: BookFields) -> Result<Book, BookRepositoryError> {
        let document = BookDocument::new(fields, DateTime::now());
        self.collection.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn update(
        &self,
        id: &str,
        fields: BookFields,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": object_id },
                doc! {
                    "$set": {
                        "title": fields.title,
                        "author": fields.author,
                        "publishedYear": fields.published_year,
                        "updatedAt": DateTime::now(),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(Book::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, BookRepositoryError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(false);
        };

        let result = self.collection.delete_one(doc! { "_id": object_id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64, BookRepositoryError> {
        let result = self.collection.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert_many(&self, books: Vec<BookFields>) -> Result<usize, BookRepositoryError> {
        // The server rejects an empty batch.
        if books.is_empty() {
            return Ok(0);
        }

        let now = DateTime::now();
        let documents: Vec<BookDocument> = books
            .into_iter()
            .map(|fields| BookDocument::new(fields, now))
            .collect();

        let result = self.collection.insert_many(&documents).await?;
        Ok(result.inserted_ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_converts_to_api_book() {
        let created = DateTime::from_millis(1_700_000_000_000);
        let document = BookDocument::new(BookFields::new("1984", "George Orwell", 1949), created);
        let hex = document.id.to_hex();

        let book = Book::from(document);

        assert_eq!(book.id, hex);
        assert_eq!(book.id.len(), 24);
        assert_eq!(book.published_year, 1949);
        assert_eq!(book.created_at.unix_timestamp(), 1_700_000_000);
        assert_eq!(book.created_at, book.updated_at);
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let document = BookDocument::new(
            BookFields::new("Pride and Prejudice", "Jane Austen", 1813),
            DateTime::now(),
        );

        let stored = bson::to_document(&document).unwrap();
        assert!(stored.get_object_id("_id").is_ok());
        assert_eq!(stored.get_i32("publishedYear").unwrap(), 1813);
        assert!(stored.get_datetime("createdAt").is_ok());
        assert!(stored.get_datetime("updatedAt").is_ok());
    }

    /// Runs against the server named by `MONGODB_URI` in a throwaway collection.
    #[tokio::test]
    #[ignore = "needs a running MongoDB; set MONGODB_URI"]
    async fn crud_and_seed_against_live_server() {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        let database = client.database("bookstore_test");
        let collection = format!("books_{}", ObjectId::new().to_hex());
        let repository = MongoBookRepository::new(&database, &collection);

        let created = repository
            .create(BookFields::new("Dune", "Frank Herbert", 1965))
            .await
            .unwrap();
        assert_eq!(repository.list().await.unwrap(), vec![created.clone()]);

        let updated = repository
            .update(&created.id, BookFields::new("Dune Messiah", "Frank Herbert", 1969))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.published_year, 1969);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = database
            .collection::<bson::Document>(&collection)
            .find_one(doc! { "_id": ObjectId::parse_str(&created.id).unwrap() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_str("title").unwrap(), "Dune Messiah");
        assert_eq!(stored.get_i32("publishedYear").unwrap(), 1969);

        let missing = ObjectId::new().to_hex();
        assert!(repository
            .update(&missing, BookFields::new("Emma", "Jane Austen", 1815))
            .await
            .unwrap()
            .is_none());

        assert!(repository.delete(&created.id).await.unwrap());
        assert!(!repository.delete(&created.id).await.unwrap());
        assert!(!repository.delete("not-an-object-id").await.unwrap());

        repository
            .create(BookFields::new("Emma", "Jane Austen", 1815))
            .await
            .unwrap();
        let report = crate::modules::books::seed::seed_books(&repository)
            .await
            .unwrap();
        assert_eq!(report.cleared, 1);
        assert_eq!(report.inserted, 4);
        assert_eq!(repository.list().await.unwrap().len(), 4);

        database
            .collection::<bson::Document>(&collection)
            .drop()
            .await
            .unwrap();
    }
}
