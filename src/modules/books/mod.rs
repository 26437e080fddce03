pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use service::BookService;

/// Books module: CRUD over book records under `/api/v1/book`
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn mount_path(&self) -> String {
        routes::BOOKS_PATH.to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let id_parameter = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookRecord" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "201": {
                                "description": "Book created",
                                "headers": {
                                    "Location": {
                                        "description": "Path of the created book",
                                        "schema": { "type": "string" }
                                    }
                                },
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookRecord" }
                                    }
                                }
                            },
                            "400": error_response("Malformed request body"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "get": {
                        "summary": "List books matching a text pattern",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "page",
                                "in": "query",
                                "description": "Zero-based page number",
                                "schema": { "type": "integer", "minimum": 0, "default": 0 }
                            },
                            {
                                "name": "size",
                                "in": "query",
                                "description": "Page size",
                                "schema": { "type": "integer", "minimum": 1, "default": 20 }
                            },
                            {
                                "name": "pattern",
                                "in": "query",
                                "description": "Case-insensitive substring matched against text fields",
                                "schema": { "type": "string", "default": "" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Page of books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookPage" }
                                    }
                                }
                            },
                            "400": error_response("Invalid paging parameters"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/{id}": {
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter.clone()],
                        "requestBody": book_body,
                        "responses": {
                            "204": { "description": "Book replaced" },
                            "400": error_response("Malformed request body"),
                            "404": error_response("Book not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter],
                        "responses": {
                            "204": { "description": "Book deleted or already absent" },
                            "500": error_response("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookRecord": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "readOnly": true },
                            "type": { "type": ["string", "null"] },
                            "quantity": { "type": ["integer", "null"] },
                            "authors": { "type": "array", "items": { "type": "string" } },
                            "name": { "type": ["string", "null"] },
                            "pages": { "type": ["integer", "null"] },
                            "publisher": { "type": ["string", "null"] },
                            "year": { "type": ["integer", "null"] },
                            "city": { "type": ["string", "null"] },
                            "department_id": { "type": ["string", "null"] },
                            "summary": { "type": ["string", "null"] },
                            "room": { "type": ["string", "null"] }
                        }
                    },
                    "BookPage": {
                        "type": "object",
                        "properties": {
                            "content": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/BookRecord" }
                            },
                            "page": {
                                "type": "object",
                                "properties": {
                                    "size": { "type": "integer" },
                                    "number": { "type": "integer" },
                                    "totalElements": { "type": "integer" },
                                    "totalPages": { "type": "integer" }
                                },
                                "required": ["size", "number", "totalElements", "totalPages"]
                            }
                        },
                        "required": ["content", "page"]
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
pub fn create_module(service: BookService) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(service))
}
