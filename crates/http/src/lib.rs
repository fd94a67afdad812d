//! HTTP server facade with Axum, error handling, and OpenAPI support.

use std::future::Future;

use anyhow::Context;
use axum::{routing::get, Router};

use bookstore_kernel::{settings::ServerSettings, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Serve the registry's routes until `shutdown` resolves
pub async fn start_server<F>(
    registry: &ModuleRegistry,
    settings: &ServerSettings,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(registry);

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under /{}",
            module.name()
        );
        router_builder = router_builder.mount_module(module.name(), module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_cors()
        .with_tracing()
        .with_request_id()
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
