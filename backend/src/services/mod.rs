pub mod prediction;
pub mod pricing;
pub mod sensor_service;

pub use prediction::AvailabilityPredictor;
pub use pricing::PricingEngine;
pub use sensor_service::{SensorReading, SensorService};
