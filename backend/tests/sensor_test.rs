mod helpers;

use helpers::*;
use smartpark_backend::models::FactorKind;
use smartpark_backend::notifications::ParkingUpdate;
use smartpark_backend::repositories::FactsStore;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_state_change_records_event_and_notifies() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 2, 0, "3.00");
    let state = fixture.live_app_state();
    let mut updates = state.broadcaster.subscribe();

    let reading = assert_ok!(state.sensors.record_reading(1, true).await);

    assert!(reading.changed);
    assert!(reading.is_occupied);
    assert!(assert_ok!(fixture.store.get_current_occupancy(1).await));

    let events = fixture.store.events(1);
    assert_eq!(events.len(), 1);
    assert!(events[0].is_occupied);

    match updates.try_recv() {
        Ok(ParkingUpdate::SensorUpdate {
            spot_id,
            is_occupied,
            ..
        }) => {
            assert_eq!(spot_id, 1);
            assert!(is_occupied);
        }
        other => panic!("expected a sensor update, got {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_reading_is_not_a_change() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 1, "3.00");
    let state = fixture.live_app_state();
    let mut updates = state.broadcaster.subscribe();

    let reading = assert_ok!(state.sensors.record_reading(1, true).await);

    assert!(!reading.changed);
    assert!(fixture.store.events(1).is_empty());
    assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_unknown_sensor_is_not_found() {
    let fixture = TestStore::new();
    fixture.store.insert_spot(spot(1, "A", "3.00"));
    let state = fixture.live_app_state();

    let err = assert_err!(state.sensors.record_reading(1, true).await);

    assert!(err.is_not_found());
    assert!(err.to_string().contains("Sensor not found for spot 1"));
}

#[tokio::test]
async fn test_publishing_without_subscribers_is_fine() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    let state = fixture.live_app_state();

    let reading = assert_ok!(state.sensors.record_reading(1, true).await);

    assert!(reading.changed);
}

#[tokio::test]
async fn test_readings_feed_pricing_and_prediction() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 5, 4, "3.00");
    let state = fixture.live_app_state();

    let before = assert_ok!(state.pricing.compute_price(1).await);
    assert!(before.has_factor(FactorKind::NormalOccupancy));

    assert_ok!(state.sensors.record_reading(5, true).await);

    let after = assert_ok!(state.pricing.compute_price(1).await);
    assert!(after.has_factor(FactorKind::HighOccupancy));
    assert_eq!(after.occupancy_rate, 100);

    let prediction = assert_ok!(state.predictor.predict_availability(5, 15).await);
    assert_eq!(prediction.historical_data_points, 1);
    assert!(prediction.currently_occupied);
}

#[tokio::test]
async fn test_consecutive_transitions_carry_durations() {
    let fixture = TestStore::new();
    fixture.seed_zone("A", 1, 1, 0, "3.00");
    let state = fixture.live_app_state();

    assert_ok!(state.sensors.record_reading(1, true).await);
    assert_ok!(state.sensors.record_reading(1, false).await);

    let events = fixture.store.events(1);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].duration_minutes, None);
    assert!(events[1].duration_minutes.is_some());
    assert!(!events[1].is_occupied);
}
