//! Short-horizon availability prediction.
//!
//! Recent occupancy transitions are folded into an exponentially weighted
//! moving average; the complement is the base probability that the spot is
//! free, adjusted for current state and the typical occupied duration.

use crate::config::PredictionConfig;
use crate::error::AppResult;
use crate::models::{Confidence, OccupancyEvent, Prediction};
use crate::repositories::FactsStore;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// EWMA occupancy score over newest-first events.
///
/// The newest event seeds the average and the remaining events are folded
/// in list order, i.e. from second-newest towards the oldest. Returns 0.5
/// for an empty slice.
pub fn ewma_score(events: &[OccupancyEvent], alpha: f64) -> f64 {
    let Some((newest, rest)) = events.split_first() else {
        return 0.5;
    };

    rest.iter().fold(newest.occupancy_value(), |ewma, event| {
        alpha * event.occupancy_value() + (1.0 - alpha) * ewma
    })
}

/// Mean `duration_minutes` over occupied events that carry a non-zero
/// duration, or `default` when there are none.
pub fn average_occupied_duration(events: &[OccupancyEvent], default: f64) -> f64 {
    let durations: Vec<f64> = events
        .iter()
        .filter(|e| e.is_occupied)
        .filter_map(|e| e.duration_minutes)
        .filter(|&minutes| minutes != 0)
        .map(f64::from)
        .collect();

    if durations.is_empty() {
        return default;
    }

    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Confidence label from sample size and signal strength
pub fn confidence_for(data_points: usize, ewma: f64, config: &PredictionConfig) -> Confidence {
    if data_points < config.low_confidence_points {
        return Confidence::Low;
    }
    if data_points < config.medium_confidence_points {
        return Confidence::Medium;
    }
    if ewma < config.strong_signal_low || ewma > config.strong_signal_high {
        return Confidence::High;
    }
    Confidence::Medium
}

/// Round a probability to two decimal places
pub fn round_probability(p: f64) -> f64 {
    (p * 100.0).round() / 100.0
}

/// Availability predictor
pub struct AvailabilityPredictor {
    store: Arc<dyn FactsStore>,
    config: PredictionConfig,
}

impl AvailabilityPredictor {
    pub fn new(store: Arc<dyn FactsStore>, config: PredictionConfig) -> Self {
        Self { store, config }
    }

    /// Probability that `spot_id` is free `horizon_minutes` from now.
    ///
    /// The horizon is not bounded here; callers enforce their own range.
    pub async fn predict_availability(
        &self,
        spot_id: i32,
        horizon_minutes: u32,
    ) -> AppResult<Prediction> {
        let events = self
            .store
            .get_recent_occupancy_events(
                spot_id,
                self.config.history_window_minutes,
                self.config.history_limit,
            )
            .await?;
        let currently_occupied = self.store.get_current_occupancy(spot_id).await?;

        if events.is_empty() {
            debug!("No recent history for spot {}, using current state", spot_id);
            let prob_free = if currently_occupied {
                self.config.no_history_prob_occupied
            } else {
                self.config.no_history_prob_free
            };
            return Ok(Prediction {
                spot_id,
                horizon_minutes,
                prob_free,
                confidence: Confidence::Low,
                currently_occupied,
                avg_occupancy_duration: None,
                historical_data_points: 0,
            });
        }

        let ewma = ewma_score(&events, self.config.alpha);
        let avg_duration = average_occupied_duration(&events, self.config.default_occupied_minutes);

        let mut prob_free = 1.0 - ewma;
        if currently_occupied {
            if f64::from(horizon_minutes) > avg_duration {
                prob_free = (prob_free * self.config.long_horizon_boost)
                    .min(self.config.long_horizon_cap);
            } else {
                prob_free = (prob_free * self.config.short_horizon_damping)
                    .max(self.config.short_horizon_floor);
            }
        } else {
            prob_free = prob_free.max(self.config.free_spot_floor);
        }

        let confidence = confidence_for(events.len(), ewma, &self.config);

        debug!(
            spot_id,
            ewma,
            avg_duration,
            data_points = events.len(),
            "Predicted availability"
        );

        Ok(Prediction {
            spot_id,
            horizon_minutes,
            prob_free: round_probability(prob_free),
            confidence,
            currently_occupied,
            avg_occupancy_duration: Some(avg_duration.round() as i64),
            historical_data_points: events.len(),
        })
    }

    /// Predict several spots concurrently. Any failure fails the whole call.
    pub async fn predict_multiple_spots(
        &self,
        spot_ids: &[i32],
        horizon_minutes: u32,
    ) -> AppResult<Vec<Prediction>> {
        join_all(
            spot_ids
                .iter()
                .map(|&spot_id| self.predict_availability(spot_id, horizon_minutes)),
        )
        .await
        .into_iter()
        .collect()
    }

    /// Spots most likely to be free after the horizon, best first.
    ///
    /// Samples at most `spot_sample_limit` spots. Equal probabilities keep
    /// the order the spots were listed in.
    pub async fn get_best_available_spots(
        &self,
        limit: usize,
        horizon_minutes: u32,
    ) -> AppResult<Vec<Prediction>> {
        let spot_ids = self
            .store
            .list_all_spot_ids(self.config.spot_sample_limit)
            .await?;

        let mut predictions = self.predict_multiple_spots(&spot_ids, horizon_minutes).await?;
        rank_by_availability(&mut predictions, limit);

        info!(
            "Ranked {} of {} spots for a {} minute horizon",
            predictions.len(),
            spot_ids.len(),
            horizon_minutes
        );

        Ok(predictions)
    }
}

/// Stable sort by descending `prob_free`, then keep the first `limit`
pub fn rank_by_availability(predictions: &mut Vec<Prediction>, limit: usize) {
    predictions.sort_by(|a, b| b.prob_free.total_cmp(&a.prob_free));
    predictions.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn events(flags: &[bool]) -> Vec<OccupancyEvent> {
        let now = Utc::now();
        flags
            .iter()
            .enumerate()
            .map(|(i, &is_occupied)| OccupancyEvent {
                id: (flags.len() - i) as i64,
                spot_id: 1,
                is_occupied,
                event_time: now - Duration::minutes(i as i64),
                duration_minutes: None,
            })
            .collect()
    }

    fn prediction(spot_id: i32, prob_free: f64) -> Prediction {
        Prediction {
            spot_id,
            horizon_minutes: 15,
            prob_free,
            confidence: Confidence::Low,
            currently_occupied: false,
            avg_occupancy_duration: None,
            historical_data_points: 0,
        }
    }

    #[test]
    fn test_ewma_fold_order() {
        let history = events(&[true, false, true, false, true]);
        let score = ewma_score(&history, 0.3);
        assert!((score - 0.6871).abs() < 1e-9);
        assert!((1.0 - score - 0.3129).abs() < 1e-9);
    }

    #[test]
    fn test_ewma_seed_only() {
        assert_eq!(ewma_score(&events(&[true]), 0.3), 1.0);
        assert_eq!(ewma_score(&events(&[false]), 0.3), 0.0);
        assert_eq!(ewma_score(&[], 0.3), 0.5);
    }

    #[test]
    fn test_average_duration_skips_free_and_missing() {
        let mut history = events(&[true, true, false, true]);
        history[0].duration_minutes = Some(20);
        history[1].duration_minutes = Some(40);
        history[2].duration_minutes = Some(500);
        history[3].duration_minutes = Some(0);
        assert_eq!(average_occupied_duration(&history, 60.0), 30.0);
        assert_eq!(average_occupied_duration(&events(&[false, true]), 60.0), 60.0);
    }

    #[test]
    fn test_confidence_boundaries() {
        let config = PredictionConfig::default();
        assert_eq!(confidence_for(4, 0.95, &config), Confidence::Low);
        assert_eq!(confidence_for(5, 0.5, &config), Confidence::Medium);
        assert_eq!(confidence_for(14, 0.05, &config), Confidence::Medium);
        assert_eq!(confidence_for(15, 0.9, &config), Confidence::High);
        assert_eq!(confidence_for(15, 0.1, &config), Confidence::High);
        assert_eq!(confidence_for(15, 0.5, &config), Confidence::Medium);
        assert_eq!(confidence_for(15, 0.8, &config), Confidence::Medium);
    }

    #[test]
    fn test_round_probability() {
        assert_eq!(round_probability(0.3129), 0.31);
        assert_eq!(round_probability(0.6871), 0.69);
        assert_eq!(round_probability(0.95), 0.95);
    }

    #[test]
    fn test_rank_is_stable_and_truncated() {
        let mut ranked = vec![
            prediction(1, 0.9),
            prediction(2, 0.3),
            prediction(3, 0.7),
            prediction(4, 0.7),
        ];
        rank_by_availability(&mut ranked, 3);
        let ids: Vec<i32> = ranked.iter().map(|p| p.spot_id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }
}
