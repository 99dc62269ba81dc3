use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn billing_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/online-booking/{clinic_id}", get(handlers::online_booking_gate));

    let protected_routes = Router::new()
        .route("/check-subscription", post(handlers::check_subscription))
        .route("/limits/{clinic_id}", get(handlers::get_plan_usage))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
