use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn dentist_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_dentist))
        .route("/clinic/{clinic_id}", get(handlers::list_dentists))
        .route("/{dentist_id}", get(handlers::get_dentist))
        .route("/{dentist_id}", put(handlers::update_dentist))
        .route("/{dentist_id}", delete(handlers::delete_dentist))
        .route("/{dentist_id}/work-hours", put(handlers::update_work_hours))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
