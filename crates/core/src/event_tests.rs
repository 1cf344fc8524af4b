// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn mid() -> MeasurementId {
    MeasurementId::new(1)
}

#[test]
fn start_and_resume_open_a_segment() {
    assert!(CaptureEvent::LifecycleStart { measurement_id: mid(), timestamp_ms: 0 }.opens_segment());
    assert!(CaptureEvent::LifecycleResume { measurement_id: mid(), timestamp_ms: 0 }.opens_segment());
    assert!(!CaptureEvent::LifecyclePause { measurement_id: mid(), timestamp_ms: 0 }.opens_segment());
}

#[test]
fn pause_and_stop_close_a_segment() {
    assert!(CaptureEvent::LifecyclePause { measurement_id: mid(), timestamp_ms: 0 }.closes_segment());
    assert!(CaptureEvent::LifecycleStop { measurement_id: mid(), timestamp_ms: 0 }.closes_segment());
    assert!(!CaptureEvent::LifecycleStart { measurement_id: mid(), timestamp_ms: 0 }.closes_segment());
}

#[test]
fn modality_change_neither_opens_nor_closes() {
    let e = CaptureEvent::ModalityTypeChange {
        measurement_id: mid(),
        timestamp_ms: 0,
        modality: Modality::Car,
    };
    assert!(!e.opens_segment());
    assert!(!e.closes_segment());
    assert_eq!(e.event_type(), EventType::ModalityTypeChange);
}

#[test]
fn serializes_with_type_tag() {
    let e = CaptureEvent::LifecycleStart { measurement_id: mid(), timestamp_ms: 42 };
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["type"], "lifecycle_start");
    assert_eq!(json["timestamp_ms"], 42);
}
