use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    // The slot grid feeds the public self-booking page, so it takes no auth
    let public_routes = Router::new()
        .route("/{clinic_id}/slots", get(handlers::get_public_slots));

    let protected_routes = Router::new()
        .route("/{clinic_id}/availability", get(handlers::get_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
