mod helpers;

use chrono::{Duration, Utc};
use helpers::*;
use smartpark_backend::models::Confidence;
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// No history
// ============================================================================

#[tokio::test]
async fn test_no_history_free_spot() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 30).await);

    assert_eq!(prediction.prob_free, 0.7);
    assert_eq!(prediction.confidence, Confidence::Low);
    assert!(!prediction.currently_occupied);
    assert_eq!(prediction.horizon_minutes, 30);
    assert_eq!(prediction.historical_data_points, 0);
    assert_eq!(prediction.avg_occupancy_duration, None);
}

#[tokio::test]
async fn test_no_history_occupied_spot() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 15).await);

    assert_eq!(prediction.prob_free, 0.3);
    assert_eq!(prediction.confidence, Confidence::Low);
    assert!(prediction.currently_occupied);
}

#[tokio::test]
async fn test_spot_without_sensor_reads_as_free() {
    let fixture = TestStore::new();
    fixture.store.insert_spot(spot(1, "A", "3.00"));
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 15).await);

    assert!(!prediction.currently_occupied);
    assert_eq!(prediction.prob_free, 0.7);
}

#[tokio::test]
async fn test_events_outside_window_are_ignored() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    let two_hours_ago = Utc::now() - Duration::hours(2);
    fixture.store.push_event(1, true, two_hours_ago, Some(30));
    fixture
        .store
        .push_event(1, false, two_hours_ago + Duration::minutes(30), None);
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 15).await);

    assert_eq!(prediction.historical_data_points, 0);
    assert_eq!(prediction.prob_free, 0.7);
}

// ============================================================================
// EWMA history
// ============================================================================

#[tokio::test]
async fn test_alternating_history_currently_free_hits_floor() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    fixture.seed_history(1, &[true, false, true, false, true]);
    let predictor = fixture.predictor();

    // EWMA 0.6871, 1 - EWMA = 0.3129 < 0.6
    let prediction = assert_ok!(predictor.predict_availability(1, 15).await);

    assert_eq!(prediction.prob_free, 0.6);
    assert_eq!(prediction.confidence, Confidence::Medium);
    assert_eq!(prediction.historical_data_points, 5);
    assert_eq!(prediction.avg_occupancy_duration, Some(60));
}

#[tokio::test]
async fn test_occupied_spot_long_horizon_boost() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    fixture.seed_history(1, &[true, false, true, false, true]);
    let predictor = fixture.predictor();

    // 0.3129 x 1.5, horizon beyond the 60 minute default duration
    let prediction = assert_ok!(predictor.predict_availability(1, 90).await);

    assert_eq!(prediction.prob_free, 0.47);
    assert!(prediction.currently_occupied);
}

#[tokio::test]
async fn test_occupied_spot_short_horizon_damping() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    fixture.seed_history(1, &[true, false, true, false, true]);
    let predictor = fixture.predictor();

    // 0.3129 x 0.5
    let prediction = assert_ok!(predictor.predict_availability(1, 30).await);

    assert_eq!(prediction.prob_free, 0.16);
}

#[tokio::test]
async fn test_long_horizon_is_capped() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    fixture.seed_history(1, &[false, false, false, false, false]);
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 120).await);

    assert_eq!(prediction.prob_free, 0.95);
}

#[tokio::test]
async fn test_short_horizon_has_floor() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    fixture.seed_history(1, &[true, true, true, true, true]);
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 10).await);

    assert_eq!(prediction.prob_free, 0.1);
}

#[tokio::test]
async fn test_recorded_durations_decide_horizon_branch() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    let now = Utc::now();
    fixture
        .store
        .push_event(1, true, now - Duration::minutes(5), Some(120));
    fixture
        .store
        .push_event(1, false, now - Duration::minutes(10), Some(15));
    fixture
        .store
        .push_event(1, true, now - Duration::minutes(20), Some(100));
    let predictor = fixture.predictor();

    // avg occupied duration 110 > horizon 90, so the damped branch applies
    let prediction = assert_ok!(predictor.predict_availability(1, 90).await);

    assert_eq!(prediction.avg_occupancy_duration, Some(110));
    assert!(prediction.prob_free <= 0.5);
}

#[tokio::test]
async fn test_probability_is_always_in_range() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 4, 2, "3.00");
    fixture.seed_history(1, &[true; 20]);
    fixture.seed_history(2, &[false; 20]);
    fixture.seed_history(3, &[true, false, false, true]);
    let predictor = fixture.predictor();

    for spot_id in 1..=4 {
        for horizon in [1, 15, 60, 120] {
            let prediction = assert_ok!(predictor.predict_availability(spot_id, horizon).await);
            assert!((0.0..=1.0).contains(&prediction.prob_free));
            assert_eq!(
                prediction.prob_free,
                (prediction.prob_free * 100.0).round() / 100.0
            );
        }
    }
}

// ============================================================================
// Confidence
// ============================================================================

#[tokio::test]
async fn test_confidence_by_sample_size() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 3, 0, "3.00");
    fixture.seed_history(1, &[true; 4]);
    fixture.seed_history(2, &[true; 14]);
    fixture.seed_history(3, &[true; 15]);
    let predictor = fixture.predictor();

    let four = assert_ok!(predictor.predict_availability(1, 15).await);
    let fourteen = assert_ok!(predictor.predict_availability(2, 15).await);
    let fifteen = assert_ok!(predictor.predict_availability(3, 15).await);

    assert_eq!(four.confidence, Confidence::Low);
    assert_eq!(fourteen.confidence, Confidence::Medium);
    assert_eq!(fifteen.confidence, Confidence::High);
}

#[tokio::test]
async fn test_weak_signal_stays_medium() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    let mut alternating = Vec::new();
    for i in 0..15 {
        alternating.push(i % 2 == 0);
    }
    fixture.seed_history(1, &alternating);
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 15).await);

    assert_eq!(prediction.historical_data_points, 15);
    assert_eq!(prediction.confidence, Confidence::Medium);
    assert_eq!(prediction.prob_free, 0.6);
}

#[tokio::test]
async fn test_history_capped_at_fifty_events() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    let now = Utc::now();
    for i in 0..55 {
        fixture
            .store
            .push_event(1, i % 3 == 0, now - Duration::seconds(i * 30 + 1), None);
    }
    let predictor = fixture.predictor();

    let prediction = assert_ok!(predictor.predict_availability(1, 15).await);

    assert_eq!(prediction.historical_data_points, 50);
}

// ============================================================================
// Multiple spots and ranking
// ============================================================================

#[tokio::test]
async fn test_predict_multiple_keeps_input_order() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 3, 1, "3.00");
    let predictor = fixture.predictor();

    let predictions = assert_ok!(predictor.predict_multiple_spots(&[3, 1, 2], 15).await);

    let ids: Vec<i32> = predictions.iter().map(|p| p.spot_id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(predictions[1].prob_free, 0.3);
}

#[tokio::test]
async fn test_predict_multiple_fails_as_a_whole() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 3, 1, "3.00");
    fixture.store.set_unavailable(true);
    let predictor = fixture.predictor();

    let err = assert_err!(predictor.predict_multiple_spots(&[1, 2, 3], 15).await);

    assert!(err.is_store_failure());
}

#[tokio::test]
async fn test_best_spots_ranked_and_limited() {
    let fixture = TestStore::new();
    fixture.store.insert_spot(spot(1, "A", "3.00"));
    fixture.store.insert_spot(spot(2, "A", "3.00"));
    fixture.store.insert_spot(spot(3, "A", "3.00"));
    fixture.store.install_sensor(1, false);
    fixture.store.install_sensor(2, true);
    fixture.store.install_sensor(3, false);
    fixture.seed_history(1, &[false]);
    let predictor = fixture.predictor();

    let best = assert_ok!(predictor.get_best_available_spots(2, 15).await);

    let ranked: Vec<(i32, f64)> = best.iter().map(|p| (p.spot_id, p.prob_free)).collect();
    assert_eq!(ranked, vec![(1, 1.0), (3, 0.7)]);
}

#[tokio::test]
async fn test_best_spots_ties_keep_listing_order() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 4, 0, "3.00");
    let predictor = fixture.predictor();

    let best = assert_ok!(predictor.get_best_available_spots(3, 15).await);

    let ids: Vec<i32> = best.iter().map(|p| p.spot_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_best_spots_samples_at_most_fifty() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 60, 0, "3.00");
    let predictor = fixture.predictor();

    let best = assert_ok!(predictor.get_best_available_spots(100, 15).await);

    assert_eq!(best.len(), 50);
    assert!(best.iter().all(|p| p.spot_id <= 50));
}

#[tokio::test]
async fn test_best_spots_with_no_spots() {
    let fixture = TestStore::new();
    let predictor = fixture.predictor();

    let best = assert_ok!(predictor.get_best_available_spots(5, 15).await);

    assert!(best.is_empty());
}
