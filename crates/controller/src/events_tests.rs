// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cap_core::MeasurementId;

#[tokio::test]
async fn subscribers_each_see_the_event() {
    let bus = EventBus::new(8);
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    bus.send(HostEvent::ServiceStarted { measurement_id: MeasurementId::new(1) });

    assert_eq!(a.recv().await.unwrap(), HostEvent::ServiceStarted { measurement_id: MeasurementId::new(1) });
    assert_eq!(b.recv().await.unwrap(), HostEvent::ServiceStarted { measurement_id: MeasurementId::new(1) });
}

#[test]
fn send_without_subscribers_is_fine() {
    let bus = EventBus::new(8);
    bus.send(HostEvent::GnssFixLost { timestamp_ms: 0 });
}
