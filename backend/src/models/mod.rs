//! Domain models for the SmartPark backend.
//!
//! Database-backed rows (spots, sensor events, pricing history) and the
//! transient values produced by the pricing and prediction engines.

pub mod occupancy_event;
pub mod prediction;
pub mod price_quote;
pub mod pricing_sample;
pub mod spot;

// Re-export all models for convenient access
pub use occupancy_event::OccupancyEvent;
pub use prediction::{Confidence, Prediction};
pub use price_quote::{reason_for, FactorKind, PriceFactor, PriceQuote, ReservationQuote};
pub use pricing_sample::{NewPricingSample, PricingSample};
pub use spot::{SensorState, Spot, ZoneOccupancy};
