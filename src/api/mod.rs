//! HTTP API
//!
//! Router construction and the shared application state handed to every
//! handler. Endpoint policies are fixed here, at registration time.

pub mod handlers;
pub mod policy;

pub use policy::{Action, CachePolicy, EndpointPolicies, EndpointPolicy};

use std::sync::Arc;

use axum::routing::{get, patch};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::rate_limit::RateLimiter;
use crate::store::AuthorStore;

/// State shared across request handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record store
    pub store: AuthorStore,

    /// Admission control
    pub limiter: RateLimiter,

    /// Per-endpoint quota and cache policies
    pub policies: Arc<EndpointPolicies>,
}

impl AppState {
    /// Assemble the shared state
    pub fn new(store: AuthorStore, limiter: RateLimiter, policies: EndpointPolicies) -> Self {
        Self {
            store,
            limiter,
            policies: Arc::new(policies),
        }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/authors",
            get(handlers::list_authors).post(handlers::create_author),
        )
        .route("/authors/reset", patch(handlers::reset))
        .route(
            "/authors/{id}",
            get(handlers::get_author)
                .put(handlers::replace_author)
                .patch(handlers::patch_author)
                .delete(handlers::delete_author),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
