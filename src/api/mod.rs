//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use routes::create_router;

/// Build the full application: API routes, health check and middleware
pub fn build_router(pool: PgPool) -> Router {
    // Order: context -> logging -> handler
    let api_routes = create_router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::context_middleware))
            .layer(axum::middleware::from_fn(middleware::logging_middleware)),
    );

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
