// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cap-strategies: pluggable, side-effect-free capture policies.
//!
//! Each policy is a closed, serializable tagged enum (the default set of
//! behaviors) plus a named-key `Custom` variant resolved through a
//! [`registry::StrategyRegistry`] the host populates before `start`. This is
//! what lets a start command carry a strategy choice across the
//! controller/worker channel as plain data even when the behavior itself is
//! a host-supplied closure.

pub mod cleaning;
pub mod distance;
pub mod registry;
pub mod sensor_capture;
pub mod space;

pub use cleaning::CleaningStrategy;
pub use distance::DistanceStrategy;
pub use registry::StrategyRegistry;
pub use sensor_capture::SensorCapture;
pub use space::SpaceStrategy;
