// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry tuning knobs.

/// Tolerances used when curves are flattened or areas are combined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryConfig {
    /// Maximum distance between a curve and its flattened polyline, in local
    /// units. Also used as the accuracy for stroke expansion.
    pub flatten_tolerance: f64,
    /// Relative distance under which two vertices are treated as one during
    /// area composition. Scaled by the magnitude of the input coordinates.
    pub snap_epsilon: f64,
}

impl GeometryConfig {
    /// Settings suitable for on-screen geometry.
    pub const DEFAULT: Self = Self {
        flatten_tolerance: 0.01,
        snap_epsilon: 1e-9,
    };

    /// Tighter flattening, for callers comparing areas numerically.
    #[must_use]
    pub const fn precise() -> Self {
        Self {
            flatten_tolerance: 1e-4,
            snap_epsilon: 1e-10,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
