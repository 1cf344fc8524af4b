// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cap_core::{test_support, MeasurementId};

fn roundtrip<T: Serialize + for<'a> Deserialize<'a> + PartialEq + std::fmt::Debug>(value: T) {
    let json = serde_json::to_string(&value).expect("serialize");
    let back: T = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(value, back);
}

#[test]
fn start_command_roundtrips_with_strategies() {
    roundtrip(ToWorker::Start {
        measurement_id: MeasurementId::new(1),
        distance_strategy: DistanceStrategy::GreatCircle,
        cleaning_strategy: CleaningStrategy::default(),
        sensor_capture: SensorCapture::default(),
        space_strategy: SpaceStrategy::default(),
    });
}

#[test]
fn probe_and_pong_carry_the_same_id() {
    let probe = ToWorker::Probe(ProbeId(7));
    roundtrip(probe);
    let pong = FromWorker::Pong(ProbeId(7));
    roundtrip(pong);
}

#[test]
fn location_captured_roundtrips() {
    let location = test_support::geolocation(MeasurementId::new(1), 1_000, 52.5, 13.4);
    roundtrip(FromWorker::LocationCaptured { location });
}

#[test]
fn stopped_itself_carries_reason() {
    roundtrip(FromWorker::StoppedItself { reason: StopReason::LowDiskSpace });
    roundtrip(FromWorker::StoppedItself { reason: StopReason::PermissionRevoked });
    roundtrip(FromWorker::StoppedItself { reason: StopReason::PersistenceFailed });
}

#[test]
fn lifecycle_acks_roundtrip() {
    roundtrip(FromWorker::Started);
    roundtrip(FromWorker::Paused);
    roundtrip(FromWorker::Resumed);
    roundtrip(FromWorker::Stopped { stopped_successfully: false });
}

#[test]
fn tagged_json_uses_type_field() {
    let json = serde_json::to_value(&ToWorker::Stop).unwrap();
    assert_eq!(json["type"], "Stop");
}
