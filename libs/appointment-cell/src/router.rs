use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // The self-booking page submits requests and lists treatments with no
    // token; the plan gate happens inside the service
    let public_routes = Router::new()
        .route(
            "/public/{clinic_id}/requests",
            post(handlers::submit_booking_request),
        )
        .route(
            "/public/{clinic_id}/treatments",
            get(handlers::list_treatments_public),
        );

    let protected_routes = Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/clinic/{clinic_id}", get(handlers::list_appointments))
        .route("/requests/clinic/{clinic_id}", get(handlers::list_pending_requests))
        .route("/requests/{request_id}/approve", post(handlers::approve_booking_request))
        .route("/requests/{request_id}/reject", post(handlers::reject_booking_request))
        .route("/treatments", post(handlers::create_treatment))
        .route("/treatments/{treatment_id}", delete(handlers::delete_treatment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::update_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
