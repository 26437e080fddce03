//! Document store plumbing: pagination types, MongoDB client factory and the
//! `db` core module.

use anyhow::Context;
use async_trait::async_trait;
use bookshelf_kernel::settings::{DatabaseSettings, StoreBackend};
use bookshelf_kernel::{InitCtx, Module};
use mongodb::{bson::doc, Client};

pub mod page;

pub use page::{Page, PageMetadata, PageRequest};

/// Create a MongoDB client for the configured URI.
///
/// The driver connects lazily, so this only validates the URI.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Client> {
    let client = Client::with_uri_str(&settings.uri)
        .await
        .with_context(|| format!("invalid MongoDB uri '{}'", settings.uri))?;

    tracing::info!(
        target: "bookshelf-db",
        database = %settings.database,
        "MongoDB client created"
    );
    Ok(client)
}

/// Core module owning the document store connection.
///
/// Holds no client for the in-memory backend.
pub struct DatabaseModule {
    client: Option<Client>,
    database: String,
}

impl DatabaseModule {
    pub fn new(client: Option<Client>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    /// Build the module for the configured backend
    pub async fn from_settings(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let client = match settings.backend {
            StoreBackend::Memory => None,
            StoreBackend::Mongo => Some(connect(settings).await?),
        };
        Ok(Self::new(client, settings.database.clone()))
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            backend = ?ctx.settings.database.backend,
            "database module initialized"
        );
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(client) = &self.client {
            client
                .database(&self.database)
                .run_command(doc! { "ping": 1 })
                .await
                .with_context(|| format!("failed to ping database '{}'", self.database))?;
            tracing::info!(module = self.name(), database = %self.database, "database reachable");
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if let Some(client) = &self.client {
            client.clone().shutdown().await;
        }
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}
