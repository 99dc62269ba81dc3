use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn clinic_routes(state: Arc<AppConfig>) -> Router {
    // The booking page resolves a clinic from its public code without a token
    let public_routes = Router::new()
        .route("/public/{public_code}", get(handlers::get_clinic_public));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_clinic))
        .route("/me", get(handlers::get_my_clinic))
        .route("/{clinic_id}", get(handlers::get_clinic))
        .route("/{clinic_id}", put(handlers::update_clinic))
        .route("/{clinic_id}/settings/{key}", get(handlers::get_setting))
        .route("/{clinic_id}/settings/{key}", put(handlers::upsert_setting))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
