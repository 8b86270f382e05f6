//! HTTP handlers for the analytics and spot endpoints.
//!
//! Handlers validate query input and delegate to the engines in
//! [`AppState`]; all pricing and prediction logic lives in the services.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::warn;

use super::dto::{
    BestSpotsQuery, BestSpotsResponse, HealthResponse, PredictQuery, PricingQuery,
    ReservationPricingQuery, SensorUpdateRequest, SensorUpdateResponse, SpotPricesResponse,
    TrendsQuery, TrendsResponse,
};
use crate::error::AppError;
use crate::models::{Prediction, PriceQuote, ReservationQuote};
use crate::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const DEFAULT_HORIZON_MINUTES: i64 = 15;
const MAX_HORIZON_MINUTES: i64 = 120;
const DEFAULT_BEST_SPOTS: usize = 5;
const DEFAULT_TREND_HOURS: i64 = 24;
const SPOT_PRICING_LIMIT: i64 = 50;

fn required<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", name)))
}

fn horizon_from(raw: Option<&str>) -> Result<u32, AppError> {
    let out_of_range = || {
        AppError::Validation(format!(
            "horizon must be between 1 and {} minutes",
            MAX_HORIZON_MINUTES
        ))
    };

    let horizon = match raw {
        None => DEFAULT_HORIZON_MINUTES,
        Some(value) => value.trim().parse::<i64>().map_err(|_| out_of_range())?,
    };
    if !(1..=MAX_HORIZON_MINUTES).contains(&horizon) {
        return Err(out_of_range());
    }
    Ok(horizon as u32)
}

/// Missing, malformed or zero limits fall back to the default
fn limit_from(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&limit| limit > 0)
        .unwrap_or(DEFAULT_BEST_SPOTS)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                timestamp: Utc::now(),
            }),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    database: "disconnected".to_string(),
                    timestamp: Utc::now(),
                }),
            )
        }
    }
}

// =============================================================================
// Prediction
// =============================================================================

/// GET /api/analytics/predict?spotId&horizon
pub async fn predict_spot_availability(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> HandlerResult<Prediction> {
    let Query(query) = query?;
    let spot_id = required(query.spot_id, "spotId")?;
    let horizon = horizon_from(query.horizon.as_deref())?;

    let prediction = state.predictor.predict_availability(spot_id, horizon).await?;
    Ok(Json(prediction))
}

/// GET /api/analytics/predict/best?limit&horizon
pub async fn get_best_spots(
    State(state): State<AppState>,
    query: Result<Query<BestSpotsQuery>, QueryRejection>,
) -> HandlerResult<BestSpotsResponse> {
    let Query(query) = query?;
    let limit = limit_from(query.limit.as_deref());
    let horizon = horizon_from(query.horizon.as_deref())?;

    let predictions = state
        .predictor
        .get_best_available_spots(limit, horizon)
        .await?;

    Ok(Json(BestSpotsResponse {
        count: predictions.len(),
        predictions,
    }))
}

// =============================================================================
// Pricing
// =============================================================================

/// GET /api/analytics/pricing?spotId
pub async fn get_spot_pricing(
    State(state): State<AppState>,
    query: Result<Query<PricingQuery>, QueryRejection>,
) -> HandlerResult<PriceQuote> {
    let Query(query) = query?;
    let spot_id = required(query.spot_id, "spotId")?;
    let quote = state.pricing.compute_price(spot_id).await?;
    Ok(Json(quote))
}

/// GET /api/analytics/pricing/{spot_id}/trends?hours
pub async fn get_pricing_trends(
    State(state): State<AppState>,
    spot_id: Result<Path<i32>, PathRejection>,
    query: Result<Query<TrendsQuery>, QueryRejection>,
) -> HandlerResult<TrendsResponse> {
    let Path(spot_id) = spot_id?;
    let Query(query) = query?;
    let hours_back = query.hours.unwrap_or(DEFAULT_TREND_HOURS);
    if hours_back < 1 {
        return Err(AppError::Validation(
            "hours must be at least 1".to_string(),
        ));
    }

    let trends = state.pricing.get_pricing_trends(spot_id, hours_back).await?;

    Ok(Json(TrendsResponse {
        spot_id,
        hours_back,
        data_points: trends.len(),
        trends,
    }))
}

/// GET /api/analytics/pricing/calculate?spotId&startTime&endTime
pub async fn calculate_reservation_pricing(
    State(state): State<AppState>,
    query: Result<Query<ReservationPricingQuery>, QueryRejection>,
) -> HandlerResult<ReservationQuote> {
    let Query(query) = query?;
    let spot_id = required(query.spot_id, "spotId")?;
    let start = required(query.start_time, "startTime")?;
    let end = required(query.end_time, "endTime")?;

    let quote = state
        .pricing
        .compute_reservation_price(spot_id, start, end)
        .await?;
    Ok(Json(quote))
}

// =============================================================================
// Spots
// =============================================================================

/// GET /api/spots/pricing
pub async fn get_spot_prices(State(state): State<AppState>) -> HandlerResult<SpotPricesResponse> {
    let spot_ids = state.store.list_all_spot_ids(SPOT_PRICING_LIMIT).await?;
    let prices = state.pricing.compute_multiple_prices(&spot_ids).await;

    Ok(Json(SpotPricesResponse {
        count: prices.len(),
        prices,
    }))
}

/// POST /api/spots/sensor-update
pub async fn update_sensor_data(
    State(state): State<AppState>,
    request: Result<Json<SensorUpdateRequest>, JsonRejection>,
) -> HandlerResult<SensorUpdateResponse> {
    let Json(request) = request?;
    let spot_id = required(request.spot_id, "spotId")?;
    let is_occupied = required(request.is_occupied, "isOccupied")?;

    let reading = state.sensors.record_reading(spot_id, is_occupied).await?;

    Ok(Json(SensorUpdateResponse {
        message: "Sensor data updated".to_string(),
        reading,
    }))
}

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_defaults_and_bounds() {
        assert_eq!(horizon_from(None).unwrap(), 15);
        assert_eq!(horizon_from(Some("1")).unwrap(), 1);
        assert_eq!(horizon_from(Some("120")).unwrap(), 120);
        assert!(horizon_from(Some("0")).is_err());
        assert!(horizon_from(Some("121")).is_err());
        assert!(horizon_from(Some("-5")).is_err());
    }

    #[test]
    fn test_malformed_horizon_gets_range_message() {
        let err = horizon_from(Some("abc")).unwrap_err();
        assert!(err
            .to_string()
            .contains("horizon must be between 1 and 120 minutes"));
    }

    #[test]
    fn test_limit_falls_back_to_default() {
        assert_eq!(limit_from(None), 5);
        assert_eq!(limit_from(Some("0")), 5);
        assert_eq!(limit_from(Some("many")), 5);
        assert_eq!(limit_from(Some("3")), 3);
    }

    #[test]
    fn test_required_names_the_parameter() {
        let err = required::<i32>(None, "spotId").unwrap_err();
        assert!(err.to_string().contains("spotId is required"));
    }
}
