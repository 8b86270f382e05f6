//! Dynamic pricing.
//!
//! A spot's price is its base price times a chain of situational
//! multipliers: peak hour, zone occupancy and recent demand for the spot.
//! Every computation leaves one row in the pricing history.

use crate::clock::Clock;
use crate::config::PricingConfig;
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{
    reason_for, FactorKind, NewPricingSample, PriceFactor, PriceQuote, PricingSample,
    ReservationQuote,
};
use crate::repositories::FactsStore;
use chrono::{DateTime, Timelike, Utc};
use futures::future::join_all;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Round a monetary amount to cents, halves away from zero
pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Pricing engine
pub struct PricingEngine {
    store: Arc<dyn FactsStore>,
    config: PricingConfig,
    clock: Arc<dyn Clock>,
}

impl PricingEngine {
    pub fn new(store: Arc<dyn FactsStore>, config: PricingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Compute the current price of a spot and record it in the pricing history
    pub async fn compute_price(&self, spot_id: i32) -> AppResult<PriceQuote> {
        let spot = option_to_result(
            self.store.get_spot(spot_id).await?,
            &format!("Spot {} not found", spot_id),
        )?;

        let now = self.clock.now();
        let hour = now.hour();
        let mut price = spot.base_price;
        let mut factors = Vec::with_capacity(3);

        let is_peak_hour = self.config.is_peak_hour(hour);
        if is_peak_hour {
            price *= self.config.peak_hour_multiplier;
            factors.push(PriceFactor::new(
                FactorKind::PeakHour,
                self.config.peak_hour_multiplier,
            ));
        }

        let zone = self.store.get_zone_occupancy(&spot.zone).await?;
        let occupancy_rate = zone.rate();
        let zone_factor = self.zone_factor(occupancy_rate);
        price *= zone_factor.multiplier;
        factors.push(zone_factor);

        // Below the threshold nothing is recorded, unlike the zone factor.
        let recent_reservations = self
            .store
            .get_recent_reservation_count(spot_id, self.config.demand_window_hours)
            .await?;
        if recent_reservations > self.config.demand_threshold {
            price *= self.config.demand_multiplier;
            factors.push(
                PriceFactor::new(FactorKind::HighDemand, self.config.demand_multiplier)
                    .with_reservations(recent_reservations),
            );
        }

        let current_price = round_price(price);
        let occupancy_pct = zone.percentage();

        debug!(
            spot_id,
            hour,
            occupancy_rate,
            recent_reservations,
            "Applied pricing factors: {}",
            reason_for(&factors)
        );

        self.store
            .append_pricing_sample(NewPricingSample {
                spot_id,
                price: current_price,
                occupancy_rate: occupancy_pct,
                time_of_day: hour as i32,
                reason: reason_for(&factors),
            })
            .await?;

        info!(
            "Priced spot {} ({}): base {} -> {}",
            spot_id, spot.zone, spot.base_price, current_price
        );

        Ok(PriceQuote {
            spot_id,
            spot_name: spot.name,
            base_price: spot.base_price,
            current_price,
            zone: spot.zone,
            is_peak_hour,
            occupancy_rate: occupancy_pct,
            factors,
            timestamp: now.with_timezone(&Utc),
        })
    }

    fn zone_factor(&self, occupancy_rate: f64) -> PriceFactor {
        if occupancy_rate > self.config.high_occupancy_threshold {
            PriceFactor::new(
                FactorKind::HighOccupancy,
                self.config.high_occupancy_multiplier,
            )
            .with_rate(occupancy_rate)
        } else if occupancy_rate < self.config.low_occupancy_threshold {
            PriceFactor::new(FactorKind::LowOccupancy, self.config.low_occupancy_discount)
                .with_rate(occupancy_rate)
        } else {
            PriceFactor::new(FactorKind::NormalOccupancy, Decimal::ONE).with_rate(occupancy_rate)
        }
    }

    /// Price a reservation window.
    ///
    /// The hourly price is the one in effect right now; it is not integrated
    /// over the peak and off-peak hours the window may span.
    pub async fn compute_reservation_price(
        &self,
        spot_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<ReservationQuote> {
        if end <= start {
            return Err(AppError::InvalidRange(format!(
                "end time {} must be after start time {}",
                end, start
            )));
        }

        let duration_hours =
            Decimal::from((end - start).num_milliseconds()) / Decimal::from(3_600_000);

        let quote = self.compute_price(spot_id).await?;
        let total_price = round_price(quote.current_price * duration_hours);
        let price_per_hour = quote.current_price;

        Ok(ReservationQuote {
            quote,
            duration_hours: round_price(duration_hours),
            total_price,
            price_per_hour,
        })
    }

    /// Price many spots concurrently. Spots whose computation fails are
    /// left out of the result; the batch itself never fails.
    pub async fn compute_multiple_prices(&self, spot_ids: &[i32]) -> Vec<PriceQuote> {
        let outcomes: Vec<(i32, AppResult<PriceQuote>)> = join_all(
            spot_ids
                .iter()
                .map(|&spot_id| async move { (spot_id, self.compute_price(spot_id).await) }),
        )
        .await;

        outcomes
            .into_iter()
            .filter_map(|(spot_id, outcome)| match outcome {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!("Skipping spot {} in batch pricing: {}", spot_id, e);
                    None
                }
            })
            .collect()
    }

    /// Pricing history for a spot over the trailing `hours_back`, newest first
    pub async fn get_pricing_trends(
        &self,
        spot_id: i32,
        hours_back: i64,
    ) -> AppResult<Vec<PricingSample>> {
        let samples = self
            .store
            .get_pricing_samples(spot_id, hours_back, self.config.trend_sample_limit)
            .await?;
        Ok(samples)
    }
}
