//! MongoDB client factory for the book store.
//!
//! The process builds one [`Connection`] at start-up and hands the
//! [`mongodb::Database`] handle to whoever needs storage access.

use anyhow::Context;
use bookstore_kernel::settings::DatabaseSettings;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};

const APP_NAME: &str = "bookstore";

/// An open client together with the database selected by the settings.
#[derive(Clone, Debug)]
pub struct Connection {
    pub client: Client,
    pub database: Database,
}

impl Connection {
    /// Close the client's connection pools.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::info!(target: "bookstore-db", "disconnected from MongoDB");
    }
}

/// Build a client from the configured URI.
///
/// The driver connects lazily, so this succeeds even when the server is down;
/// use [`ping`] to verify reachability.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Connection> {
    let mut options = ClientOptions::parse(settings.uri.as_str())
        .await
        .with_context(|| "invalid MongoDB connection string")?;
    options.app_name = Some(APP_NAME.to_string());

    let name = resolve_database_name(settings.name.as_deref(), options.default_database.as_deref());

    let client = Client::with_options(options).context("failed to create MongoDB client")?;
    let database = client.database(&name);

    tracing::info!(target: "bookstore-db", database = %name, "MongoDB client created");

    Ok(Connection { client, database })
}

/// Round-trip a `ping` command to confirm the server is reachable.
pub async fn ping(database: &Database) -> anyhow::Result<()> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .with_context(|| format!("failed to reach MongoDB database '{}'", database.name()))?;

    tracing::info!(target: "bookstore-db", database = %database.name(), "connected to MongoDB");
    Ok(())
}

/// Explicit name first, then the URI's path segment, then the fallback.
pub fn resolve_database_name(configured: Option<&str>, uri_default: Option<&str>) -> String {
    configured
        .or(uri_default)
        .filter(|name| !name.is_empty())
        .unwrap_or(DatabaseSettings::FALLBACK_DATABASE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_name_wins() {
        assert_eq!(
            resolve_database_name(Some("catalog"), Some("book-store")),
            "catalog"
        );
    }

    #[test]
    fn uri_default_used_when_unconfigured() {
        assert_eq!(resolve_database_name(None, Some("library")), "library");
    }

    #[test]
    fn falls_back_to_book_store() {
        assert_eq!(resolve_database_name(None, None), "book-store");
    }

    #[tokio::test]
    async fn connect_reads_database_from_uri() {
        let settings = DatabaseSettings {
            uri: "mongodb://localhost:27017/shelf".to_string(),
            ..DatabaseSettings::default()
        };

        let connection = connect(&settings).await.unwrap();
        assert_eq!(connection.database.name(), "shelf");
    }

    #[tokio::test]
    async fn connect_rejects_malformed_uri() {
        let settings = DatabaseSettings {
            uri: "postgres://localhost/shelf".to_string(),
            ..DatabaseSettings::default()
        };

        assert!(connect(&settings).await.is_err());
    }
}
