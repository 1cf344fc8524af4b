// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregates raw barometer samples into one [`Pressure`] reading per
//! averaging window.

use cap_core::{MeasurementId, Pressure};

use crate::source::RawPressureSample;

pub struct PressureAggregator {
    window_ms: u64,
    window_start_ms: Option<u64>,
    samples: Vec<RawPressureSample>,
}

impl PressureAggregator {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms, window_start_ms: None, samples: Vec::new() }
    }

    /// Accumulate one sample; if it closes out the current window, return the
    /// averaged [`Pressure`] reading.
    pub fn push(&mut self, measurement_id: MeasurementId, sample: RawPressureSample) -> Option<Pressure> {
        let window_start = *self.window_start_ms.get_or_insert(sample.timestamp_ms);

        if sample.timestamp_ms.saturating_sub(window_start) >= self.window_ms {
            let averaged = self.flush(measurement_id);
            self.window_start_ms = Some(sample.timestamp_ms);
            self.samples.push(sample);
            return averaged;
        }

        self.samples.push(sample);
        None
    }

    /// Flush whatever is buffered as a partial window, e.g. on pause/stop.
    pub fn flush(&mut self, measurement_id: MeasurementId) -> Option<Pressure> {
        if self.samples.is_empty() {
            return None;
        }
        let mut samples = std::mem::take(&mut self.samples);
        let mean_hpa = samples.iter().map(|s| s.value_hpa).sum::<f64>() / samples.len() as f64;

        samples.sort_by_key(|s| s.timestamp_ms);
        let median_timestamp_ms = samples[samples.len() / 2].timestamp_ms;

        Pressure::new(measurement_id, median_timestamp_ms, mean_hpa).ok()
    }
}

#[cfg(test)]
#[path = "pressure_tests.rs"]
mod tests;
