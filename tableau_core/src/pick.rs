// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray picking primitives.
//!
//! A [`PickRay`] is a parametric ray `origin + t * direction` with a clip
//! interval on `t`. Rays are transformed into node-local space by the inverse
//! of the node's world transform; because the direction is not renormalized,
//! `t` keeps the same meaning in every space and hits from different nodes
//! can be compared directly.
//!
//! Closest-hit resolution goes through a single [`PickResultChooser`] shared
//! by every intersection test of a pick pass. Intersection routines ask the
//! chooser whether a candidate distance [`is_closer`](PickResultChooser::is_closer)
//! before doing any expensive hit-point or texture-coordinate work.

use kurbo::Point;

use crate::math::Vec3;
use crate::node::NodeId;
use crate::transform::Transform3d;

/// Which triangle facing is discarded during picking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CullFace {
    /// Both facings are pickable.
    None,
    /// Faces pointing away from the ray origin are ignored.
    #[default]
    Back,
    /// Faces pointing toward the ray origin are ignored.
    Front,
}

/// A parametric pick ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickRay {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction. Not required to be unit length.
    pub direction: Vec3,
    /// Smallest accepted `t`.
    pub near_clip: f64,
    /// Largest accepted `t`.
    pub far_clip: f64,
}

impl PickRay {
    /// Creates a ray with an unbounded forward clip interval `[0, inf]`.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            near_clip: 0.0,
            far_clip: f64::INFINITY,
        }
    }

    /// Returns a copy with the given clip interval.
    #[must_use]
    pub const fn with_clip(mut self, near: f64, far: f64) -> Self {
        self.near_clip = near;
        self.far_clip = far;
        self
    }

    /// The point at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Maps the ray through `transform`, keeping the clip interval.
    #[must_use]
    pub fn transformed(&self, transform: &Transform3d) -> Self {
        Self {
            origin: transform.transform_point(self.origin),
            direction: transform.transform_vector(self.direction),
            near_clip: self.near_clip,
            far_clip: self.far_clip,
        }
    }

    /// Whether `t` lies within the clip interval.
    #[must_use]
    pub fn in_clip(&self, t: f64) -> bool {
        t >= self.near_clip && t <= self.far_clip
    }
}

/// The resolved closest hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickResult {
    /// The node that was hit, when picking through a scene graph.
    pub node: Option<NodeId>,
    /// Ray parameter of the hit.
    pub distance: f64,
    /// Index of the hit triangle for mesh-backed shapes.
    pub face: Option<usize>,
    /// Hit point in the local space of the hit node.
    pub point: Vec3,
    /// Texture coordinate at the hit point, if it could be resolved.
    pub tex_coord: Option<Point>,
}

/// Tracks the closest pick candidate across many intersection tests.
#[derive(Clone, Debug, Default)]
pub struct PickResultChooser {
    best: Option<PickResult>,
    current_node: Option<NodeId>,
}

impl PickResultChooser {
    /// Creates an empty chooser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node attributed to subsequent offers.
    pub fn set_candidate(&mut self, node: Option<NodeId>) {
        self.current_node = node;
    }

    /// Whether a hit at `distance` would replace the current best.
    #[must_use]
    pub fn is_closer(&self, distance: f64) -> bool {
        self.best.is_none_or(|b| distance < b.distance)
    }

    /// Offers a hit. Returns `true` if it became the new best.
    pub fn offer(
        &mut self,
        distance: f64,
        face: Option<usize>,
        point: Vec3,
        tex_coord: Option<Point>,
    ) -> bool {
        if !self.is_closer(distance) {
            return false;
        }
        self.best = Some(PickResult {
            node: self.current_node,
            distance,
            face,
            point,
            tex_coord,
        });
        true
    }

    /// The best hit so far.
    #[must_use]
    pub fn result(&self) -> Option<&PickResult> {
        self.best.as_ref()
    }

    /// Consumes the chooser, returning the best hit.
    #[must_use]
    pub fn into_result(self) -> Option<PickResult> {
        self.best
    }

    /// Whether no hit has been accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chooser_keeps_closest() {
        let mut c = PickResultChooser::new();
        assert!(c.is_closer(f64::MAX));
        assert!(c.offer(5.0, None, Vec3::ZERO, None));
        assert!(!c.offer(7.0, None, Vec3::ZERO, None));
        assert!(!c.is_closer(5.0), "ties keep the first hit");
        assert!(c.offer(2.0, Some(3), Vec3::ZERO, None));
        let best = c.into_result().expect("hit");
        assert_eq!(best.distance, 2.0);
        assert_eq!(best.face, Some(3));
    }

    #[test]
    fn transformed_ray_keeps_parameter() {
        let ray = PickRay::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z_AXIS);
        let t = Transform3d::from_translation(5.0, 0.0, 0.0);
        let local = ray.transformed(&t);
        assert_eq!(local.point_at(4.0), t.transform_point(ray.point_at(4.0)));
    }

    #[test]
    fn clip_interval() {
        let ray = PickRay::new(Vec3::ZERO, Vec3::Z_AXIS).with_clip(1.0, 3.0);
        assert!(!ray.in_clip(0.5));
        assert!(ray.in_clip(1.0));
        assert!(ray.in_clip(3.0));
        assert!(!ray.in_clip(3.5));
    }
}
