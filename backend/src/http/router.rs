//! Router configuration for the HTTP API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::AppState;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let analytics = Router::new()
        .route("/predict", get(handlers::predict_spot_availability))
        .route("/predict/best", get(handlers::get_best_spots))
        .route("/pricing", get(handlers::get_spot_pricing))
        .route("/pricing/calculate", get(handlers::calculate_reservation_pricing))
        .route("/pricing/{spot_id}/trends", get(handlers::get_pricing_trends));

    let spots = Router::new()
        .route("/pricing", get(handlers::get_spot_prices))
        .route("/sensor-update", post(handlers::update_sensor_data));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/analytics", analytics)
        .nest("/api/spots", spots)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
