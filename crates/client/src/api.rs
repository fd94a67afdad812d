use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// A book as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub published_year: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: &'static str,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The `/books` operations the view depends on.
#[async_trait]
pub trait BooksApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, ClientError>;
    async fn create(&self, input: &BookInput) -> Result<Book, ClientError>;
    async fn update(&self, id: &str, input: &BookInput) -> Result<Book, ClientError>;
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

/// `reqwest`-backed implementation talking to a running server.
#[derive(Debug, Clone)]
pub struct HttpBooksApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBooksApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    pub fn book_url(&self, id: &str) -> String {
        format!("{}/books/{}", self.base_url, id)
    }
}

fn ensure_success(
    response: reqwest::Response,
    message: &'static str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::warn!(%status, reason = message, "book store request rejected");
        Err(ClientError::Status { status, message })
    }
}

#[async_trait]
impl BooksApi for HttpBooksApi {
    async fn list(&self) -> Result<Vec<Book>, ClientError> {
        let response = self.client.get(self.books_url()).send().await?;
        let books = ensure_success(response, "Failed to fetch books")?
            .json()
            .await?;
        Ok(books)
    }

    async fn create(&self, input: &BookInput) -> Result<Book, ClientError> {
        let response = self.client.post(self.books_url()).json(input).send().await?;
        let book = ensure_success(response, "Failed to save book")?.json().await?;
        Ok(book)
    }

    async fn update(&self, id: &str, input: &BookInput) -> Result<Book, ClientError> {
        let response = self.client.put(self.book_url(id)).json(input).send().await?;
        let book = ensure_success(response, "Failed to save book")?.json().await?;
        Ok(book)
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self.client.delete(self.book_url(id)).send().await?;
        ensure_success(response, "Failed to delete book")?;
        Ok(())
    }
}
