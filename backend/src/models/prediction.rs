use serde::{Deserialize, Serialize};

/// Qualitative reliability of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Probability that a spot is free after a horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub spot_id: i32,
    pub horizon_minutes: u32,
    /// 0.0..=1.0, two decimal places
    pub prob_free: f64,
    pub confidence: Confidence,
    pub currently_occupied: bool,
    /// Mean occupied duration in whole minutes; absent without history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_occupancy_duration: Option<i64>,
    pub historical_data_points: usize,
}
