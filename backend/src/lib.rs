//! SmartPark analytics backend library
//!
//! Dynamic pricing and short-horizon availability prediction for parking
//! spots, exposed to the binary, the HTTP layer and tests.

pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use clock::Clock;
use config::{PredictionConfig, PricingConfig};
use notifications::UpdateBroadcaster;
use repositories::{FactsStore, PgFactsStore, SensorStore};
use services::{AvailabilityPredictor, PricingEngine, SensorService};
use std::sync::Arc;

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FactsStore>,
    pub pricing: Arc<PricingEngine>,
    pub predictor: Arc<AvailabilityPredictor>,
    pub sensors: Arc<SensorService>,
    pub broadcaster: Arc<UpdateBroadcaster>,
}

impl AppState {
    /// Wire the engines on top of a store that serves both facts and sensor writes
    pub fn new<S>(
        store: Arc<S>,
        pricing: PricingConfig,
        prediction: PredictionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        S: FactsStore + SensorStore + 'static,
    {
        let facts: Arc<dyn FactsStore> = store.clone();
        let sensor_store: Arc<dyn SensorStore> = store;
        let broadcaster = Arc::new(UpdateBroadcaster::default());

        Self {
            pricing: Arc::new(PricingEngine::new(facts.clone(), pricing, clock.clone())),
            predictor: Arc::new(AvailabilityPredictor::new(facts.clone(), prediction)),
            sensors: Arc::new(SensorService::new(
                sensor_store,
                broadcaster.clone(),
                clock,
            )),
            store: facts,
            broadcaster,
        }
    }

    /// Application state backed by PostgreSQL
    pub fn from_pool(pool: sqlx::PgPool, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(PgFactsStore::new(pool)),
            config.pricing.clone(),
            config.prediction.clone(),
            clock,
        )
    }
}
