pub mod models;
pub mod repository;
pub mod routes;
pub mod seed;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use repository::SharedRepository;

/// Book catalog module, served under `/books`
pub struct BooksModule {
    repository: SharedRepository,
}

impl BooksModule {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = %ctx.settings.database.collection,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/NewBook" }
                }
            }
        });
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every stored book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error("Storage unavailable")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "201": book_response("Created book"),
                            "400": error("Missing or malformed field"),
                            "500": error("Storage unavailable")
                        }
                    }
                },
                "/{id}": {
                    "put": {
                        "summary": "Replace a book's fields",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "requestBody": book_body,
                        "responses": {
                            "200": book_response("Updated book"),
                            "400": error("Missing or malformed field"),
                            "404": error("No book with this id"),
                            "500": error("Storage unavailable")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Deleted, or already absent",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "message": { "type": "string" } }
                                        }
                                    }
                                }
                            },
                            "500": error("Storage unavailable")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string", "description": "Storage-assigned identifier" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "publishedYear": { "type": "integer" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["_id", "title", "author", "publishedYear", "createdAt", "updatedAt"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "publishedYear": { "type": "integer" }
                        },
                        "required": ["title", "author", "publishedYear"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(repository: SharedRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(repository))
}
