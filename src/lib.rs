//! Bookshelf application library
//!
//! Wires the books module, the document store and the HTTP server together.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::DatabaseModule;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use modules::books::repository::{BookRepository, InMemoryBookRepository, MongoBookRepository};
use modules::books::service::BookService;

/// Registry with the `db` core module and every project module, the books
/// module backed by the configured store
pub async fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let db = DatabaseModule::from_settings(&settings.database)
        .await
        .context("failed to set up the document store")?;

    let repository: Arc<dyn BookRepository> = match db.client() {
        Some(client) => Arc::new(MongoBookRepository::new(
            client
                .database(&settings.database.database)
                .collection(&settings.database.collection),
        )),
        None => Arc::new(InMemoryBookRepository::new()),
    };

    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(db));
    modules::register_all(&mut registry, BookService::new(repository));
    Ok(registry)
}

/// Run the service until shutdown: init and start modules, serve HTTP, then
/// stop modules in reverse order
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookshelf bootstrap starting"
    );

    let registry = build_registry(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;
    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_all().await;

    served?;
    stopped
}
