// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned 3-D bounding boxes.

use kurbo::Rect;

use crate::math::Vec3;
use crate::transform::Transform3d;

/// An axis-aligned box in 3-D. Empty when any `max` component is below its
/// `min` component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// The empty box. Adding any point yields a box around that point.
    pub const EMPTY: Self = Self {
        min: Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        max: Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// Creates bounds from explicit corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether the box contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grows the box to include `p`.
    pub fn add_point(&mut self, p: Vec3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest box containing both inputs. Empty inputs are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let mut out = self;
        out.add_point(other.min);
        out.add_point(other.max);
        out
    }

    /// Lifts a 2-D rectangle onto the `z = 0` plane.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(Vec3::new(rect.x0, rect.y0, 0.0), Vec3::new(rect.x1, rect.y1, 0.0))
    }

    /// Drops the Z extent. Returns `None` when empty.
    #[must_use]
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            None
        } else {
            Some(Rect::new(self.min.x, self.min.y, self.max.x, self.max.y))
        }
    }

    /// Width along X, or 0 when empty.
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.x - self.min.x }
    }

    /// Height along Y, or 0 when empty.
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.y - self.min.y }
    }

    /// Bounds of the eight corners mapped through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Transform3d) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let mut out = Self::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.add_point(transform.transform_point(corner));
        }
        out
    }

    /// Depth along Z, or 0 when empty.
    #[must_use]
    pub fn depth(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.z - self.min.z }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}
