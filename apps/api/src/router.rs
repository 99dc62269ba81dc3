use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use billing_cell::router::billing_routes;
use clinic_cell::router::clinic_routes;
use dentist_cell::router::dentist_routes;
use notification_cell::router::notification_routes;
use patient_cell::router::patient_routes;
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental clinic API is running!" }))
        .nest("/scheduling", scheduling_routes(state.clone()))
        .nest("/clinics", clinic_routes(state.clone()))
        .nest("/dentists", dentist_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/billing", billing_routes(state.clone()))
        .nest("/notifications", notification_routes(state))
}
