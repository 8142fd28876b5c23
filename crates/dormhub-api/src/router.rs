//! Route definitions for the DormHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use dormhub_core::config::ServerConfig;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(registration_routes())
        .merge(inventory_routes())
        .merge(availability_routes())
        .merge(reconciliation_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Registration, lookup, identity edit, release
fn registration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/registrations",
            post(handlers::registration::register).get(handlers::registration::list),
        )
        .route(
            "/registrations/{id}",
            get(handlers::registration::get)
                .patch(handlers::registration::update)
                .delete(handlers::registration::release),
        )
}

/// Bulk import and listings
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(handlers::inventory::list_rooms))
        .route("/rooms/import", post(handlers::inventory::import_rooms))
        .route("/tags", get(handlers::inventory::list_tags))
        .route("/tags/import", post(handlers::inventory::import_tags))
}

/// Picker feeds
fn availability_routes() -> Router<AppState> {
    Router::new()
        .route("/availability", get(handlers::availability::snapshot))
        .route("/availability/stream", get(handlers::availability::stream))
}

/// Manual sweep
fn reconciliation_routes() -> Router<AppState> {
    Router::new().route(
        "/reconciliation/sweep",
        post(handlers::reconciliation::request_sweep),
    )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
