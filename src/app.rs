use std::sync::Arc;

use anyhow::Context;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{self, books::repository::MongoBookRepository};

/// Connect to storage, bring every module up and serve HTTP until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let connection = bookstore_db::connect(&settings.database)
        .await
        .context("failed to configure MongoDB client")?;

    // An unreachable database is not fatal: requests fail with 500 until it recovers.
    if let Err(err) = bookstore_db::ping(&connection.database).await {
        tracing::error!(error = ?err, "error connecting to MongoDB");
    }

    let repository = Arc::new(MongoBookRepository::new(
        &connection.database,
        &settings.database.collection,
    ));

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, repository);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &settings.server, shutdown_signal()).await;

    registry.stop_all().await?;
    connection.shutdown().await;

    served
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "unable to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
