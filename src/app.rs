//! Shared application state and router construction.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{config::Config, handlers, middleware, services::AccessKeyService};

/// State shared with every handler via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub keys: AccessKeyService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(keys: AccessKeyService, config: Config) -> Self {
        Self {
            keys,
            config: Arc::new(config),
        }
    }
}

/// Build the HTTP router.
///
/// Routes that act on "the current owner's key" sit behind the owner
/// middleware; health and key verification are public.
pub fn build_router(state: AppState) -> Router {
    let owner_routes = Router::new()
        // Access key page
        .route(
            "/study_1",
            get(handlers::study::show_page).post(handlers::study::submit_form),
        )
        // JSON API
        .route(
            "/api/v1/access-key",
            post(handlers::access_keys::generate_key),
        )
        .route(
            "/api/v1/access-key/status",
            get(handlers::access_keys::get_status),
        )
        .route(
            "/api/v1/access-key/check",
            get(handlers::access_keys::check_access),
        )
        .route_layer(axum_middleware::from_fn(
            middleware::owner::owner_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/access-key/verify",
            post(handlers::access_keys::verify_key),
        )
        .merge(owner_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
