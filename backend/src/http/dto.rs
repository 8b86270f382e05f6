//! Request and response bodies for the HTTP API.

use crate::models::{Prediction, PriceQuote, PricingSample};
use crate::services::SensorReading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query for `GET /api/analytics/predict`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictQuery {
    pub spot_id: Option<i32>,
    /// Parsed by the handler so a malformed value gets the range message
    pub horizon: Option<String>,
}

/// Query for `GET /api/analytics/predict/best`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestSpotsQuery {
    pub limit: Option<String>,
    pub horizon: Option<String>,
}

/// Query for `GET /api/analytics/pricing`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuery {
    pub spot_id: Option<i32>,
}

/// Query for `GET /api/analytics/pricing/{spot_id}/trends`
#[derive(Debug, Clone, Deserialize)]
pub struct TrendsQuery {
    pub hours: Option<i64>,
}

/// Query for `GET /api/analytics/pricing/calculate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPricingQuery {
    pub spot_id: Option<i32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Body for `POST /api/spots/sensor-update`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorUpdateRequest {
    pub spot_id: Option<i32>,
    pub is_occupied: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestSpotsResponse {
    pub count: usize,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsResponse {
    pub spot_id: i32,
    pub hours_back: i64,
    pub data_points: usize,
    pub trends: Vec<PricingSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpotPricesResponse {
    pub count: usize,
    pub prices: Vec<PriceQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorUpdateResponse {
    pub message: String,
    #[serde(flatten)]
    pub reading: SensorReading,
}
