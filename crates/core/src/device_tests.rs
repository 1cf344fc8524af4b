// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_id_has_expected_prefix() {
    let id = DeviceId::new();
    assert!(id.as_str().starts_with(DeviceId::PREFIX));
}

#[test]
fn ids_are_unique() {
    assert_ne!(DeviceId::new(), DeviceId::new());
}

#[test]
fn roundtrips_through_string() {
    let id = DeviceId::new();
    let parsed = DeviceId::from_string(id.as_str());
    assert_eq!(id, parsed);
}

#[test]
fn serializes_as_a_plain_string() {
    let id = DeviceId::from_string("dev-abc123");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"dev-abc123\"");
    let back: DeviceId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
