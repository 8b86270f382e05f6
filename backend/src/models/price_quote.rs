use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Named multiplicative adjustment applied to a base price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    PeakHour,
    HighOccupancy,
    LowOccupancy,
    NormalOccupancy,
    HighDemand,
}

impl FactorKind {
    /// Name used in pricing history reasons and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorKind::PeakHour => "peak_hour",
            FactorKind::HighOccupancy => "high_occupancy",
            FactorKind::LowOccupancy => "low_occupancy",
            FactorKind::NormalOccupancy => "normal_occupancy",
            FactorKind::HighDemand => "high_demand",
        }
    }
}

impl std::fmt::Display for FactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied factor with the metric that triggered it, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFactor {
    pub factor: FactorKind,
    pub multiplier: Decimal,
    /// Zone occupancy rate (0.0..=1.0) for the occupancy factors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    /// Trailing reservation count for the demand factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservations: Option<i64>,
}

impl PriceFactor {
    pub fn new(factor: FactorKind, multiplier: Decimal) -> Self {
        Self {
            factor,
            multiplier,
            rate: None,
            reservations: None,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_reservations(mut self, count: i64) -> Self {
        self.reservations = Some(count);
        self
    }
}

/// Join factor names into the reason string stored with a pricing sample
pub fn reason_for(factors: &[PriceFactor]) -> String {
    factors
        .iter()
        .map(|f| f.factor.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a single price computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub spot_id: i32,
    pub spot_name: String,
    pub base_price: Decimal,
    pub current_price: Decimal,
    pub zone: String,
    pub is_peak_hour: bool,
    /// Zone occupancy as a whole percentage
    pub occupancy_rate: i32,
    pub factors: Vec<PriceFactor>,
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    /// Whether a factor of the given kind was applied
    pub fn has_factor(&self, kind: FactorKind) -> bool {
        self.factors.iter().any(|f| f.factor == kind)
    }

    /// Multiplier recorded for the given factor kind
    pub fn multiplier_for(&self, kind: FactorKind) -> Option<Decimal> {
        self.factors
            .iter()
            .find(|f| f.factor == kind)
            .map(|f| f.multiplier)
    }
}

/// Price quote for a reservation window. The hourly price is the snapshot
/// taken when the quote was computed, not an average over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationQuote {
    #[serde(flatten)]
    pub quote: PriceQuote,
    pub duration_hours: Decimal,
    pub total_price: Decimal,
    pub price_per_hour: Decimal,
}
