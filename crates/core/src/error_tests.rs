// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn range_violation_formats_field_and_value() {
    let err = CaptureError::RangeViolation { field: "lat", value: 95.0 };
    assert_eq!(err.to_string(), "lat out of range: 95");
}

#[test]
fn persistence_failure_carries_message() {
    let err = CaptureError::PersistenceFailure("disk full".to_string());
    assert_eq!(err.to_string(), "persistence failure: disk full");
}
