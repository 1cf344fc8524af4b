// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cap_core::{test_support, SensorKind};

fn location_item(id: MeasurementId) -> WriteItem {
    WriteItem::Locations { id, locations: vec![test_support::geolocation(id, 0, 0.0, 0.0)] }
}

fn sensor_item(id: MeasurementId, timestamp_ms: u64) -> WriteItem {
    WriteItem::SensorPoints {
        id,
        points: vec![SensorPoint::new(id, timestamp_ms, SensorKind::Acceleration, 0.0, 0.0, 9.8)],
    }
}

fn batch_timestamp(item: &WriteItem) -> u64 {
    match item {
        WriteItem::SensorPoints { points, .. } => points[0].timestamp_ms,
        other => panic!("expected a sensor batch, got {other:?}"),
    }
}

#[test]
fn oldest_sensor_batch_is_evicted_once_full() {
    let id = MeasurementId::new(1);
    let mut queue = BoundedQueue::new(1);

    queue.push(sensor_item(id, 1_000));
    queue.push(sensor_item(id, 2_000));

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.dropped_sensor_batches(), 1);
    // Drop-oldest: the newer batch survives.
    assert_eq!(batch_timestamp(&queue.pop().unwrap()), 2_000);
}

#[test]
fn incoming_sensor_batch_drops_when_no_queued_one_can_make_room() {
    let id = MeasurementId::new(1);
    let mut queue = BoundedQueue::new(1);

    queue.push(location_item(id));
    queue.push(sensor_item(id, 1_000));

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.dropped_sensor_batches(), 1);
    assert!(matches!(queue.pop().unwrap(), WriteItem::Locations { .. }));
}

#[test]
fn locations_are_never_dropped_even_over_capacity() {
    let id = MeasurementId::new(1);
    let mut queue = BoundedQueue::new(1);

    queue.push(location_item(id));
    queue.push(location_item(id));
    queue.push(location_item(id));

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.dropped_sensor_batches(), 0);
}

#[test]
fn eviction_preserves_the_order_of_everything_else() {
    let id = MeasurementId::new(1);
    let mut queue = BoundedQueue::new(3);

    queue.push(sensor_item(id, 1_000));
    queue.push(location_item(id));
    queue.push(sensor_item(id, 2_000));
    queue.push(sensor_item(id, 3_000));

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.dropped_sensor_batches(), 1);
    assert!(matches!(queue.pop().unwrap(), WriteItem::Locations { .. }));
    assert_eq!(batch_timestamp(&queue.pop().unwrap()), 2_000);
    assert_eq!(batch_timestamp(&queue.pop().unwrap()), 3_000);
}

#[test]
fn pop_returns_items_in_fifo_order() {
    let id = MeasurementId::new(1);
    let mut queue = BoundedQueue::new(10);
    queue.push(location_item(id));
    queue.push(sensor_item(id, 1_000));

    assert!(matches!(queue.pop().unwrap(), WriteItem::Locations { .. }));
    assert!(matches!(queue.pop().unwrap(), WriteItem::SensorPoints { .. }));
    assert!(queue.pop().is_none());
}
